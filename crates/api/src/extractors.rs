//! Request extractors.
//!
//! Body and query extractors reject with [`AppError`] and its JSON envelope.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use marketplace_common::AppError;
use marketplace_core::{Claims, Role};

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// `multipart/form-data` body.
pub struct Multipart(pub axum::extract::Multipart);

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Multipart::from_request(req, state)
            .await
            .map(Self)
            .map_err(AppError::from)
    }
}

fn claims_for(parts: &Parts, role: Role) -> Result<Claims, AppError> {
    // Set by auth middleware
    let claims = parts
        .extensions
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    if claims.role != role {
        return Err(AppError::Unauthorized(format!("{role:?} access required")));
    }
    Ok(claims)
}

macro_rules! role_extractor {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub Claims);

        impl<S> FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                _state: &S,
            ) -> Result<Self, Self::Rejection> {
                claims_for(parts, $role).map(Self)
            }
        }
    };
}

role_extractor!(
    /// Authenticated admin.
    AuthAdmin,
    Role::Admin
);
role_extractor!(
    /// Authenticated seller.
    AuthSeller,
    Role::Seller
);
role_extractor!(
    /// Authenticated customer.
    AuthCustomer,
    Role::Customer
);
