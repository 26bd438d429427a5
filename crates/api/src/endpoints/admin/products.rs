//! Product review.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, put},
};
use marketplace_common::AppResult;
use marketplace_core::{BulkReviewResult, ProductPatch};
use marketplace_db::entities::product;
use serde::{Deserialize, Serialize};

use super::ListQuery;
use crate::{
    extractors::{AuthAdmin, Json, Query},
    middleware::AppState,
    response::{ApiResponse, Empty, PageResponse, message},
};

/// `{action, reason}`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `{ids[], action, reason}`.
#[derive(Debug, Deserialize)]
pub struct BulkReviewRequest {
    #[serde(alias = "productIds")]
    pub ids: Vec<String>,
    pub action: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub product: product::Model,
}

async fn list(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<PageResponse<product::Model>>> {
    let page = state
        .product_service
        .list(
            query.search.as_deref(),
            query.status.as_deref(),
            query.page,
            query.limit,
        )
        .await?;
    Ok(ApiResponse::ok(page.into()))
}

async fn show(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.product_service.get(&id).await?;
    Ok(ApiResponse::ok(ProductResponse { product }))
}

async fn review(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state
        .product_service
        .review(&id, &req.action, req.reason)
        .await?;
    Ok(ApiResponse::ok(ProductResponse { product }).with_message("Product reviewed"))
}

async fn bulk_review(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<BulkReviewRequest>,
) -> AppResult<ApiResponse<BulkReviewResult>> {
    let result = state
        .product_service
        .bulk_review(req.ids, &req.action, req.reason)
        .await?;
    Ok(ApiResponse::ok(result).with_message("Products reviewed"))
}

async fn patch(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProductPatch>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.product_service.patch(&id, req).await?;
    Ok(ApiResponse::ok(ProductResponse { product }).with_message("Product updated"))
}

async fn delete(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.product_service.delete(&id).await?;
    Ok(message("Product deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/bulk", put(bulk_review))
        .route("/{id}", get(show).patch(patch).delete(delete))
        .route("/{id}/approve", put(review))
}
