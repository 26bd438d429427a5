//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use marketplace_db::repositories::Paged;
use serde::Serialize;

/// Success envelope: `{success: true, message?, ...data}`.
///
/// `T` must serialize as a map so its fields can sit next to `success`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    status: StatusCode,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a 200 response.
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: None,
            data,
        }
    }

    /// Create a 201 response.
    pub const fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            success: true,
            message: None,
            data,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Empty payload.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Success with only a message.
pub fn message(text: impl Into<String>) -> ApiResponse<Empty> {
    ApiResponse::ok(Empty {}).with_message(text)
}

/// Paging metadata for list endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// A page of rows.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> From<Paged<T>> for PageResponse<T> {
    fn from(page: Paged<T>) -> Self {
        let pagination = Pagination {
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(),
        };
        Self {
            items: page.items,
            pagination,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Payload {
        token: &'static str,
    }

    #[test]
    fn test_payload_is_flattened() {
        let body = serde_json::to_value(
            ApiResponse::ok(Payload { token: "t" }).with_message("Logged in"),
        )
        .unwrap();
        assert_eq!(
            body,
            json!({"success": true, "message": "Logged in", "token": "t"})
        );
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created(Empty {}).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_page_metadata() {
        let page = PageResponse::from(Paged {
            items: vec![1, 2],
            total: 21,
            page: 2,
            limit: 10,
        });
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.items, vec![1, 2]);
    }
}
