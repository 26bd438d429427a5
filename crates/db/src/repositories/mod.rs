//! Repositories and the list/search helpers they share.

mod admin;
mod category;
mod contact_message;
mod customer;
mod product;
mod seller;

pub use admin::AdminRepository;
pub use category::CategoryRepository;
pub use contact_message::ContactMessageRepository;
pub use customer::CustomerRepository;
pub use product::{ProductRepository, ProductReviewColumns};
pub use seller::SellerRepository;

use marketplace_common::AppError;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// `OFFSET` is a signed 64-bit value in Postgres.
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Offset pagination request. Both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Build a request from optional query parameters, clamping out-of-range values.
    #[must_use]
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip, saturating at the largest offset Postgres accepts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let skip = (self.page - 1).saturating_mul(self.limit);
        if skip > MAX_OFFSET { MAX_OFFSET } else { skip }
    }
}

/// One page of rows plus the total matching count.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Paged<T> {
    /// `ceil(total / limit)`.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit)
    }

    /// Convert the rows while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Postgres SQLSTATE 23505 message prefix.
const UNIQUE_VIOLATION: &str = "duplicate key value violates unique constraint";

/// Map a failed insert or update. Unique-key collisions become `Conflict`.
pub(crate) fn write_error(err: DbErr, conflict: &str) -> AppError {
    let unique = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains(UNIQUE_VIOLATION);
    if unique {
        tracing::debug!(error = %err, "Unique constraint violated");
        AppError::Conflict(conflict.to_string())
    } else {
        AppError::Database(err.to_string())
    }
}

/// Case-insensitive substring match on a column.
pub(crate) fn contains_ci<C: IntoColumnRef>(column: C, term: &str) -> SimpleExpr {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{escaped}%"))
}

/// Normalize a search parameter; blank means no search.
pub(crate) fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let page = PageRequest::new(Some(0), Some(0), 10);
        assert_eq!(page, PageRequest { page: 1, limit: 1 });

        let page = PageRequest::new(None, Some(10_000), 10);
        assert_eq!(page.limit, MAX_PAGE_SIZE);

        let page = PageRequest::new(Some(3), None, 12);
        assert_eq!(page.offset(), 24);
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        let page = PageRequest::new(Some(u64::MAX), Some(100), 10);
        assert_eq!(page.offset(), MAX_OFFSET);

        let page = PageRequest::new(Some(MAX_OFFSET + 2), Some(1), 10);
        assert_eq!(page.offset(), MAX_OFFSET);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let paged: Paged<()> = Paged {
            items: vec![],
            total: 21,
            page: 1,
            limit: 10,
        };
        assert_eq!(paged.total_pages(), 3);

        let empty: Paged<()> = Paged {
            items: vec![],
            total: 0,
            page: 1,
            limit: 10,
        };
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_write_error_maps_unique_violation() {
        let err = DbErr::Query(sea_orm::RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"seller_email_key\"".to_string(),
        ));
        assert!(matches!(write_error(err, "taken"), AppError::Conflict(msg) if msg == "taken"));

        let err = DbErr::Conn(sea_orm::RuntimeErr::Internal("connection refused".to_string()));
        assert!(matches!(write_error(err, "taken"), AppError::Database(_)));
    }

    #[test]
    fn test_search_term_ignores_blank() {
        assert_eq!(search_term(Some("  ")), None);
        assert_eq!(search_term(Some(" acme ")), Some("acme"));
        assert_eq!(search_term(None), None);
    }
}
