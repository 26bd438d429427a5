//! Customer signup and login.

use axum::{Router, extract::State, routing::post};
use marketplace_common::AppResult;
use marketplace_core::{CustomerSession, CustomerSignup};
use serde::Deserialize;

use crate::{extractors::Json, middleware::AppState, response::ApiResponse};

/// Login request. The identifier may be an email address or a mobile number.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "mobile", alias = "emailOrMobile")]
    pub email: String,
    pub password: String,
}

/// Verify the emailed code and create the customer.
async fn verify_and_register(
    State(state): State<AppState>,
    Json(req): Json<CustomerSignup>,
) -> AppResult<ApiResponse<CustomerSession>> {
    let session = state.customer_service.register_verified(req).await?;
    Ok(ApiResponse::created(session).with_message("Registration successful"))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<CustomerSession>> {
    let session = state
        .customer_service
        .login(&req.email, &req.password)
        .await?;
    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(super::otp::send_otp))
        .route("/verify-otp", post(verify_and_register))
        .route("/login", post(login))
}
