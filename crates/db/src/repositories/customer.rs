//! Customer repository.

use std::sync::Arc;

use super::{PageRequest, Paged, contains_ci, search_term, write_error};
use crate::entities::{Customer, customer};
use marketplace_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Reported when an insert or update hits a unique index.
const CONFLICT: &str = "A customer with this email or referral code already exists";

/// Customer repository for database operations.
#[derive(Clone)]
pub struct CustomerRepository {
    db: Arc<DatabaseConnection>,
}

impl CustomerRepository {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a customer by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<customer::Model>> {
        Customer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a customer by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<customer::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
    }

    /// Find a customer by normalized (lowercase) email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<customer::Model>> {
        Customer::find()
            .filter(customer::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a customer by normalized mobile number.
    pub async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<customer::Model>> {
        Customer::find()
            .filter(customer::Column::Mobile.eq(mobile))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the customer owning a referral code.
    pub async fn find_by_own_code(&self, code: &str) -> AppResult<Option<customer::Model>> {
        Customer::find()
            .filter(customer::Column::CustomerOwnCode.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new customer.
    pub async fn create(&self, model: customer::ActiveModel) -> AppResult<customer::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, CONFLICT))
    }

    /// Update a customer.
    pub async fn update(&self, model: customer::ActiveModel) -> AppResult<customer::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| write_error(e, CONFLICT))
    }

    /// Delete a customer. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Customer::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Admin listing with search over names, email and mobile.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<customer::CustomerStatus>,
        page: PageRequest,
    ) -> AppResult<Paged<customer::Model>> {
        let mut condition = Condition::all();
        if let Some(term) = search_term(search) {
            condition = condition.add(
                Condition::any()
                    .add(contains_ci(customer::Column::FullName, term))
                    .add(contains_ci(customer::Column::FirstName, term))
                    .add(contains_ci(customer::Column::LastName, term))
                    .add(contains_ci(customer::Column::Email, term))
                    .add(contains_ci(customer::Column::Mobile, term)),
            );
        }
        if let Some(status) = status {
            condition = condition.add(customer::Column::Status.eq(status));
        }

        let total = Customer::find()
            .filter(condition.clone())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let items = Customer::find()
            .filter(condition)
            .order_by_desc(customer::Column::CreatedAt)
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

    /// Count customers, optionally restricted to one status.
    pub async fn count(&self, status: Option<customer::CustomerStatus>) -> AppResult<u64> {
        let mut query = Customer::find();
        if let Some(status) = status {
            query = query.filter(customer::Column::Status.eq(status));
        }
        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{ActiveValue::Set, DatabaseBackend, DbErr, MockDatabase, RuntimeErr};

    #[tokio::test]
    async fn test_count_by_status() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(4)) },
                ]])
                .into_connection(),
        );
        let repo = CustomerRepository::new(db);

        let count = repo
            .count(Some(customer::CustomerStatus::Active))
            .await
            .unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_find_by_mobile_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<customer::Model>::new()])
                .into_connection(),
        );
        let repo = CustomerRepository::new(db);

        assert!(repo.find_by_mobile("+919876543210").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_conflict() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                    "duplicate key value violates unique constraint \"customer_email_key\""
                        .to_string(),
                ))])
                .into_connection(),
        );
        let repo = CustomerRepository::new(db);

        let active = customer::ActiveModel {
            id: Set("c1".to_string()),
            email: Set("taken@example.com".to_string()),
            ..Default::default()
        };
        let result = repo.update(active).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
