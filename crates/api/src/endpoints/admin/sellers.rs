//! Seller review.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, put},
};
use marketplace_common::AppResult;
use marketplace_core::{SellerDetail, SellerPatch, SellerStats};
use marketplace_db::entities::seller;
use serde::{Deserialize, Serialize};

use super::{ApprovalRequest, ListQuery, StatusRequest};
use crate::{
    extractors::{AuthAdmin, Json, Query},
    middleware::AppState,
    response::{ApiResponse, Empty, PageResponse, message},
};

/// `{status, remarks}` for the signed agreement.
#[derive(Debug, Deserialize)]
pub struct AgreementRequest {
    pub status: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Serialize)]
pub struct SellerResponse {
    pub seller: seller::Model,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub stats: SellerStats,
}

async fn list(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<PageResponse<seller::Model>>> {
    let page = state
        .seller_service
        .list(
            query.search.as_deref(),
            query.status.as_deref(),
            query.page,
            query.limit,
        )
        .await?;
    Ok(ApiResponse::ok(page.into()))
}

async fn stats(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<StatsResponse>> {
    let stats = state.seller_service.stats().await?;
    Ok(ApiResponse::ok(StatsResponse { stats }))
}

async fn show(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SellerDetail>> {
    Ok(ApiResponse::ok(state.seller_service.detail(&id).await?))
}

async fn approve(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ApprovalRequest>,
) -> AppResult<ApiResponse<SellerResponse>> {
    let seller = state
        .seller_service
        .approve(&id, req.approved, req.reason)
        .await?;
    let text = if req.approved {
        "Seller approved"
    } else {
        "Seller rejected"
    };
    Ok(ApiResponse::ok(SellerResponse { seller }).with_message(text))
}

async fn set_status(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> AppResult<ApiResponse<SellerResponse>> {
    let seller = state
        .seller_service
        .set_status(&id, &req.status, req.reason)
        .await?;
    Ok(ApiResponse::ok(SellerResponse { seller }).with_message("Seller status updated"))
}

async fn review_agreement(
    AuthAdmin(claims): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AgreementRequest>,
) -> AppResult<ApiResponse<SellerResponse>> {
    let seller = state
        .seller_service
        .review_agreement(&id, &req.status, req.remarks, &claims.sub)
        .await?;
    Ok(ApiResponse::ok(SellerResponse { seller }).with_message("Agreement reviewed"))
}

async fn patch(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SellerPatch>,
) -> AppResult<ApiResponse<SellerResponse>> {
    let seller = state.seller_service.patch(&id, req).await?;
    Ok(ApiResponse::ok(SellerResponse { seller }).with_message("Seller updated"))
}

async fn delete(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.seller_service.delete(&id).await?;
    Ok(message("Seller deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/stats", get(stats))
        .route("/{id}", get(show).patch(patch).delete(delete))
        .route("/{id}/approve", put(approve))
        .route("/{id}/status", put(set_status))
        .route("/{id}/agreement", put(review_agreement))
}
