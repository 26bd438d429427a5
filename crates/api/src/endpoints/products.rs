//! Public catalog endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use marketplace_common::AppResult;
use marketplace_db::entities::product;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::Query,
    middleware::AppState,
    response::{ApiResponse, PageResponse},
};

/// Catalog query.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(alias = "search")]
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub product: product::Model,
}

/// Approved, public products.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<ApiResponse<PageResponse<product::Model>>> {
    let page = state
        .product_service
        .list_public(query.q.as_deref(), query.page, query.limit)
        .await?;
    Ok(ApiResponse::ok(page.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.product_service.get_public(&id).await?;
    Ok(ApiResponse::ok(ProductResponse { product }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/search", get(list))
        .route("/{id}", get(show))
}
