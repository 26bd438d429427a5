//! Product repository.

use std::sync::Arc;

use super::{PageRequest, Paged, contains_ci, search_term};
use crate::entities::{Product, product};
use marketplace_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Review columns written to many products at once.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductReviewColumns {
    pub approval_status: product::ProductApprovalStatus,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub approval_reason: String,
    pub is_public: bool,
    pub updated_at: DateTimeWithTimeZone,
}

/// Product repository for database operations.
#[derive(Clone)]
pub struct ProductRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a product by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<product::Model>> {
        Product::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a product by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<product::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    /// Find a product visible in the public catalog.
    pub async fn find_public_by_id(&self, id: &str) -> AppResult<Option<product::Model>> {
        Product::find_by_id(id)
            .filter(Self::public_condition())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new product.
    pub async fn create(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a product.
    pub async fn update(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a product. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Product::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Products submitted by one seller, newest first.
    pub async fn find_by_seller(&self, seller_id: &str) -> AppResult<Vec<product::Model>> {
        Product::find()
            .filter(product::Column::SellerId.eq(seller_id))
            .order_by_desc(product::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Admin listing with search over title, SKU, description and cached seller info.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<product::ProductApprovalStatus>,
        page: PageRequest,
    ) -> AppResult<Paged<product::Model>> {
        let mut condition = Condition::all();
        if let Some(term) = search_term(search) {
            condition = condition.add(Self::search_condition(term));
        }
        if let Some(status) = status {
            condition = condition.add(product::Column::ApprovalStatus.eq(status));
        }
        self.paged(condition, page).await
    }

    /// Public catalog listing: approved and public products only.
    pub async fn list_public(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AppResult<Paged<product::Model>> {
        let mut condition = Self::public_condition();
        if let Some(term) = search_term(search) {
            condition = condition.add(
                Condition::any()
                    .add(contains_ci(product::Column::Title, term))
                    .add(contains_ci(product::Column::Description, term)),
            );
        }
        self.paged(condition, page).await
    }

    /// Count how many of the given IDs exist.
    pub async fn count_by_ids(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        Product::find()
            .filter(product::Column::Id.is_in(ids.to_vec()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write the same review outcome to every listed product in one statement.
    ///
    /// Returns the number of rows the database reports as modified.
    pub async fn review_many(
        &self,
        ids: &[String],
        columns: ProductReviewColumns,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = Product::update_many()
            .col_expr(
                product::Column::ApprovalStatus,
                Expr::value(columns.approval_status),
            )
            .col_expr(product::Column::ApprovedAt, Expr::value(columns.approved_at))
            .col_expr(
                product::Column::ApprovalReason,
                Expr::value(columns.approval_reason),
            )
            .col_expr(product::Column::IsPublic, Expr::value(columns.is_public))
            .col_expr(product::Column::UpdatedAt, Expr::value(columns.updated_at))
            .filter(product::Column::Id.is_in(ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    fn public_condition() -> Condition {
        Condition::all()
            .add(product::Column::IsPublic.eq(true))
            .add(product::Column::ApprovalStatus.eq(product::ProductApprovalStatus::Approved))
    }

    fn search_condition(term: &str) -> Condition {
        Condition::any()
            .add(contains_ci(product::Column::Title, term))
            .add(contains_ci(product::Column::Sku, term))
            .add(contains_ci(product::Column::SellerBusinessName, term))
            .add(contains_ci(product::Column::SellerEmail, term))
            .add(contains_ci(product::Column::Description, term))
    }

    async fn paged(
        &self,
        condition: Condition,
        page: PageRequest,
    ) -> AppResult<Paged<product::Model>> {
        let total = Product::find()
            .filter(condition.clone())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let items = Product::find()
            .filter(condition)
            .order_by_desc(product::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Paged {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }
}
