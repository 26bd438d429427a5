//! Category endpoints.

use axum::{Router, extract::State, routing::get};
use marketplace_common::AppResult;
use marketplace_db::entities::category;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<category::Model>,
}

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<CategoriesResponse>> {
    let categories = state.category_service.list().await?;
    Ok(ApiResponse::ok(CategoriesResponse { categories }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
