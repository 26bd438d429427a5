//! Customer self-service endpoints.

use axum::{Router, extract::State, routing::put};
use marketplace_common::AppResult;
use marketplace_core::ProfileUpdate;
use marketplace_db::entities::customer;
use serde::Serialize;

use crate::{
    extractors::{AuthCustomer, Json},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Serialize)]
pub struct CustomerResponse {
    pub customer: customer::Model,
}

async fn update_profile(
    AuthCustomer(claims): AuthCustomer,
    State(state): State<AppState>,
    Json(req): Json<ProfileUpdate>,
) -> AppResult<ApiResponse<CustomerResponse>> {
    let customer = state
        .customer_service
        .update_profile(&claims.sub, req)
        .await?;
    Ok(ApiResponse::ok(CustomerResponse { customer }).with_message("Profile updated"))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/update-profile", put(update_profile))
}
