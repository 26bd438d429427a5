//! Seller repository.

use std::sync::Arc;

use super::{PageRequest, Paged, contains_ci, search_term, write_error};
use crate::entities::{Seller, seller};
use chrono::{DateTime, Utc};
use marketplace_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Reported when an insert or update hits a unique index.
const CONFLICT: &str = "A seller with this email or referral code already exists";

/// Seller repository for database operations.
#[derive(Clone)]
pub struct SellerRepository {
    db: Arc<DatabaseConnection>,
}

impl SellerRepository {
    /// Create a new seller repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a seller by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<seller::Model>> {
        Seller::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a seller by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<seller::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Seller not found".to_string()))
    }

    /// Find a seller by normalized (lowercase) email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<seller::Model>> {
        Seller::find()
            .filter(seller::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the seller owning a referral code.
    pub async fn find_by_referral_code(&self, code: &str) -> AppResult<Option<seller::Model>> {
        Seller::find()
            .filter(seller::Column::ReferralCode.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the seller holding an unexpired reset token hash.
    pub async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<seller::Model>> {
        Seller::find()
            .filter(seller::Column::ResetPasswordToken.eq(token_hash))
            .filter(seller::Column::ResetPasswordExpiresAt.gt(now))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new seller.
    pub async fn create(&self, model: seller::ActiveModel) -> AppResult<seller::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, CONFLICT))
    }

    /// Update a seller.
    pub async fn update(&self, model: seller::ActiveModel) -> AppResult<seller::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, CONFLICT))
    }

    /// Delete a seller. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Seller::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Admin listing with search over business name, email and names.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<seller::SellerStatus>,
        page: PageRequest,
    ) -> AppResult<Paged<seller::Model>> {
        let mut condition = Condition::all();
        if let Some(term) = search_term(search) {
            condition = condition.add(
                Condition::any()
                    .add(contains_ci(seller::Column::BusinessName, term))
                    .add(contains_ci(seller::Column::Email, term))
                    .add(contains_ci(seller::Column::FirstName, term))
                    .add(contains_ci(seller::Column::LastName, term)),
            );
        }
        if let Some(status) = status {
            condition = condition.add(seller::Column::Status.eq(status));
        }

        let total = Seller::find()
            .filter(condition.clone())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let items = Seller::find()
            .filter(condition)
            .order_by_desc(seller::Column::CreatedAt)
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

    /// Count sellers, optionally restricted to one status.
    pub async fn count(&self, status: Option<seller::SellerStatus>) -> AppResult<u64> {
        let mut query = Seller::find();
        if let Some(status) = status {
            query = query.filter(seller::Column::Status.eq(status));
        }
        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
