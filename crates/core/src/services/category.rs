//! Catalog categories.

use marketplace_common::AppResult;
use marketplace_db::{entities::category, repositories::CategoryRepository};

/// Category service.
#[derive(Clone)]
pub struct CategoryService {
    category_repo: CategoryRepository,
}

impl CategoryService {
    #[must_use]
    pub const fn new(category_repo: CategoryRepository) -> Self {
        Self { category_repo }
    }

    /// Every category with its subcategories.
    pub async fn list(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_all().await
    }
}
