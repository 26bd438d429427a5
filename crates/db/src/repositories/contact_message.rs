//! Contact message repository.

use std::sync::Arc;

use crate::entities::contact_message;
use marketplace_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection};

/// Contact message repository for database operations.
#[derive(Clone)]
pub struct ContactMessageRepository {
    db: Arc<DatabaseConnection>,
}

impl ContactMessageRepository {
    /// Create a new contact message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Persist a submission.
    pub async fn create(
        &self,
        model: contact_message::ActiveModel,
    ) -> AppResult<contact_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
