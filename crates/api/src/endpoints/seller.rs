//! Seller endpoints: registration, login, password reset and own products.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use marketplace_common::{AppError, AppResult};
use marketplace_core::{
    DeliveryStatus, DocumentUpload, FormFields, ProductSubmission, SellerSession,
};
use marketplace_db::entities::{product, seller};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthSeller, Json, Multipart},
    middleware::AppState,
    response::{ApiResponse, Empty, message},
};

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(alias = "newPassword")]
    pub password: String,
}

/// Outcome of a reset request.
#[derive(Serialize)]
pub struct DeliveryResponse {
    pub delivery: DeliveryStatus,
}

#[derive(Serialize)]
pub struct SellerResponse {
    pub seller: seller::Model,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub product: product::Model,
}

#[derive(Serialize)]
pub struct ProductsResponse {
    pub products: Vec<product::Model>,
}

fn bad_multipart(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Malformed multipart body: {e}"))
}

/// Register a seller from a multipart form of text fields and document files.
async fn register(
    State(state): State<AppState>,
    Multipart(mut multipart): Multipart,
) -> AppResult<ApiResponse<SellerSession>> {
    let mut form = FormFields::new();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();
        if name.is_empty() {
            continue;
        }

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(bad_multipart)?;
            uploads.push(DocumentUpload {
                field: name,
                file_name,
                content_type,
                data,
            });
        } else {
            let text = field.text().await.map_err(bad_multipart)?;
            form.insert(name, text);
        }
    }

    let session = state.seller_service.register(form, uploads).await?;
    Ok(ApiResponse::created(session).with_message("Seller registered successfully"))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<SellerSession>> {
    let session = state
        .seller_service
        .login(&req.email, &req.password)
        .await?;
    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<DeliveryResponse>> {
    let delivery = state.seller_service.forgot_password(&req.email).await?;
    let text = if delivery.is_sent() {
        "Password reset link sent"
    } else {
        "Reset link created but email delivery failed"
    };
    Ok(ApiResponse::ok(DeliveryResponse { delivery }).with_message(text))
}

async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<ApiResponse<Empty>> {
    state
        .seller_service
        .reset_password(&token, &req.password)
        .await?;
    Ok(message("Password has been reset"))
}

/// The authenticated seller's products, newest first.
async fn my_products(
    AuthSeller(claims): AuthSeller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProductsResponse>> {
    let products = state.product_service.list_for_seller(&claims.sub).await?;
    Ok(ApiResponse::ok(ProductsResponse { products }))
}

/// Submit a product for review.
async fn submit_product(
    AuthSeller(claims): AuthSeller,
    State(state): State<AppState>,
    Json(req): Json<ProductSubmission>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.product_service.submit(&claims.sub, req).await?;
    Ok(ApiResponse::created(ProductResponse { product })
        .with_message("Product submitted for review"))
}

/// Public seller profile.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SellerResponse>> {
    let seller = state.seller_service.get(&id).await?;
    Ok(ApiResponse::ok(SellerResponse { seller }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", post(reset_password))
        .route("/products", get(my_products).post(submit_product))
        .route("/{id}", get(show))
}
