//! API endpoints.

mod admin;
mod auth;
mod categories;
mod contact;
mod customer;
mod otp;
mod products;
mod seller;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/otp", otp::router())
        .nest("/auth", auth::router())
        .nest("/seller", seller::router())
        .nest("/customer", customer::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/contact", contact::router())
        .nest("/admin", admin::router())
}
