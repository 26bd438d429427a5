//! One-time password endpoints.

use axum::{Router, extract::State, routing::post};
use marketplace_common::AppResult;
use marketplace_core::IssuedOtp;
use serde::Deserialize;
use validator::Validate;

use crate::{
    extractors::Json,
    middleware::AppState,
    response::{ApiResponse, Empty, message},
};

/// Request a code.
#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(email)]
    pub email: String,
}

/// Check a code.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    #[serde(alias = "code")]
    pub otp: String,
}

/// Issue a code and mail it. Delivery failure is reported, not raised.
pub(super) async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> AppResult<ApiResponse<IssuedOtp>> {
    req.validate()?;

    let issued = state.otp_gate.issue(&req.email).await?;
    let text = if issued.delivery.is_sent() {
        "OTP sent to email"
    } else {
        "OTP generated but email delivery failed"
    };
    Ok(ApiResponse::ok(issued).with_message(text))
}

/// Consume a code.
async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> AppResult<ApiResponse<Empty>> {
    state.otp_gate.verify(&req.email, &req.otp).await?;
    Ok(message("OTP verified successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(send_otp))
        .route("/verify", post(verify_otp))
}
