//! Contact form endpoint.

use axum::{Router, extract::State, routing::post};
use marketplace_common::AppResult;
use marketplace_core::{ContactReceipt, ContactSubmission};

use crate::{extractors::Json, middleware::AppState, response::ApiResponse};

/// Store the message; mail failures are reported in `delivery`.
async fn send(
    State(state): State<AppState>,
    Json(req): Json<ContactSubmission>,
) -> AppResult<ApiResponse<ContactReceipt>> {
    let receipt = state.contact_service.submit(req).await?;
    let text = if receipt.delivery.is_sent() {
        "Message sent successfully"
    } else {
        "Message saved but email notification failed"
    };
    Ok(ApiResponse::ok(receipt).with_message(text))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/send", post(send))
}
