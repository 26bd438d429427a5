//! HTTP API layer for the marketplace backend.
//!
//! - **Endpoints**: registration, OTP, catalog and admin review routes under `/api`
//! - **Extractors**: role-checked principals from bearer tokens
//! - **Middleware**: bearer token decoding, application state
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};
use marketplace_common::AppError;

pub use endpoints::router;
pub use middleware::AppState;

/// The `/api` tree with authentication applied and state attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
