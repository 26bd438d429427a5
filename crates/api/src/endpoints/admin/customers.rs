//! Customer review.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, put},
};
use marketplace_common::AppResult;
use marketplace_core::CustomerStats;
use marketplace_db::entities::customer;
use serde::Serialize;

use super::{ApprovalRequest, ListQuery, StatusRequest};
use crate::{
    extractors::{AuthAdmin, Json, Query},
    middleware::AppState,
    response::{ApiResponse, Empty, PageResponse, message},
};

#[derive(Serialize)]
pub struct CustomerResponse {
    pub customer: customer::Model,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub stats: CustomerStats,
}

async fn list(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<PageResponse<customer::Model>>> {
    let page = state
        .customer_service
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
    let stats = state.customer_service.stats().await?;
    Ok(ApiResponse::ok(StatsResponse { stats }))
}

async fn show(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CustomerResponse>> {
    let customer = state.customer_service.get(&id).await?;
    Ok(ApiResponse::ok(CustomerResponse { customer }))
}

async fn approve(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ApprovalRequest>,
) -> AppResult<ApiResponse<CustomerResponse>> {
    let customer = state
        .customer_service
        .approve(&id, req.approved, req.reason)
        .await?;
    let text = if req.approved {
        "Customer approved"
    } else {
        "Customer rejected"
    };
    Ok(ApiResponse::ok(CustomerResponse { customer }).with_message(text))
}

async fn set_status(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> AppResult<ApiResponse<CustomerResponse>> {
    let customer = state
        .customer_service
        .set_status(&id, &req.status, req.reason)
        .await?;
    Ok(ApiResponse::ok(CustomerResponse { customer }).with_message("Customer status updated"))
}

async fn delete(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.customer_service.delete(&id).await?;
    Ok(message("Customer deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/stats", get(stats))
        .route("/{id}", get(show).delete(delete))
        .route("/{id}/approve", put(approve))
        .route("/{id}/status", put(set_status))
}
