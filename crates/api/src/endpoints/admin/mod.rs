//! Admin endpoints: account bootstrap plus review of sellers, products and customers.

mod customers;
mod products;
mod sellers;

use axum::{Router, extract::State, routing::post};
use marketplace_common::AppResult;
use marketplace_core::{AdminRegistration, AdminSession};
use serde::Deserialize;

use crate::{extractors::Json, middleware::AppState, response::ApiResponse};

/// Admin login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Shared list query.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// `{approved, reason}`.
#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `{status, reason}`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Bootstrap the first admin.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<AdminRegistration>,
) -> AppResult<ApiResponse<AdminSession>> {
    let session = state.admin_service.register(req).await?;
    Ok(ApiResponse::created(session).with_message("Admin registered"))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<AdminSession>> {
    let session = state.admin_service.login(&req.email, &req.password).await?;
    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .nest("/sellers", sellers::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
}
