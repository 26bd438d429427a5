//! Product service: seller submissions, public catalog and admin review.

use std::collections::HashSet;

use chrono::Utc;
use marketplace_common::{AppError, AppResult, IdGenerator};
use marketplace_db::{
    entities::product::{self, ProductApprovalStatus},
    repositories::{PageRequest, Paged, ProductRepository, ProductReviewColumns, SellerRepository},
};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

use super::review::{ProductAction, ReviewDecision, parse_status_filter};

/// Default admin list page size.
pub const ADMIN_PRODUCT_PAGE_SIZE: u64 = 20;
/// Default catalog page size.
pub const CATALOG_PAGE_SIZE: u64 = 20;

/// A product as submitted by its seller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSubmission {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(deserialize_with = "lenient_i32")]
    pub stock: i32,
    pub sku: String,
    pub categories: Vec<String>,
    pub images: Vec<String>,
}

/// Fields an admin may edit on a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub sku: Option<String>,
    pub is_public: Option<bool>,
}

impl ProductPatch {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.description.is_none()
            && self.categories.is_none()
            && self.sku.is_none()
            && self.is_public.is_none()
    }
}

/// Aggregate outcome of a bulk review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReviewResult {
    pub matched: u64,
    pub modified: u64,
}

/// Product service for business logic.
#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    seller_repo: SellerRepository,
    id_gen: IdGenerator,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub const fn new(product_repo: ProductRepository, seller_repo: SellerRepository) -> Self {
        Self {
            product_repo,
            seller_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a product for review. It stays hidden until approved.
    pub async fn submit(
        &self,
        seller_id: &str,
        input: ProductSubmission,
    ) -> AppResult<product::Model> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if !input.price.is_finite() || input.price < 0.0 {
            return Err(AppError::Validation("Price must be a non-negative number".to_string()));
        }

        let seller = self.seller_repo.get_by_id(seller_id).await?;

        let model = product::ActiveModel {
            id: Set(self.id_gen.generate()),
            seller_id: Set(seller.id),
            title: Set(title),
            description: Set(input.description.trim().to_string()),
            price: Set(input.price),
            stock: Set(input.stock.max(0)),
            sku: Set(input.sku.trim().to_string()),
            categories: Set(string_array(input.categories)),
            images: Set(string_array(input.images)),
            approval_status: Set(ProductApprovalStatus::Pending),
            approved_at: Set(None),
            approval_reason: Set(String::new()),
            is_public: Set(false),
            seller_business_name: Set(seller.business_name),
            seller_email: Set(seller.email),
            seller_phone: Set(seller.phone),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let product = self.product_repo.create(model).await?;
        info!(product_id = %product.id, seller_id = %product.seller_id, "Product submitted");
        Ok(product)
    }

    /// A seller's own products, any status.
    pub async fn list_for_seller(&self, seller_id: &str) -> AppResult<Vec<product::Model>> {
        self.product_repo.find_by_seller(seller_id).await
    }

    /// Public catalog, optionally filtered by a search term.
    pub async fn list_public(
        &self,
        search: Option<&str>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Paged<product::Model>> {
        self.product_repo
            .list_public(search, PageRequest::new(page, limit, CATALOG_PAGE_SIZE))
            .await
    }

    /// A product visible in the public catalog.
    pub async fn get_public(&self, id: &str) -> AppResult<product::Model> {
        self.product_repo
            .find_public_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    /// Admin listing. Products have no suspended status.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<&str>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Paged<product::Model>> {
        let status = parse_status_filter(status)?
            .map(ProductApprovalStatus::try_from)
            .transpose()?;
        self.product_repo
            .list(search, status, PageRequest::new(page, limit, ADMIN_PRODUCT_PAGE_SIZE))
            .await
    }

    /// Admin view of any product.
    pub async fn get(&self, id: &str) -> AppResult<product::Model> {
        self.product_repo.get_by_id(id).await
    }

    /// Approve or reject one product.
    pub async fn review(
        &self,
        id: &str,
        action: &str,
        reason: Option<String>,
    ) -> AppResult<product::Model> {
        let action: ProductAction = action.parse()?;
        let columns = review_columns(&ReviewDecision::new(action.target(), reason))?;
        let product = self.product_repo.get_by_id(id).await?;

        let mut active = product.into_active_model();
        active.approval_status = Set(columns.approval_status);
        active.approved_at = Set(columns.approved_at);
        active.approval_reason = Set(columns.approval_reason);
        active.is_public = Set(columns.is_public);
        active.updated_at = Set(Some(columns.updated_at));
        let product = self.product_repo.update(active).await?;

        info!(product_id = %product.id, action = ?action, "Product reviewed");
        Ok(product)
    }

    /// Apply one decision to many products. Unknown ids are skipped.
    pub async fn bulk_review(
        &self,
        ids: Vec<String>,
        action: &str,
        reason: Option<String>,
    ) -> AppResult<BulkReviewResult> {
        let action: ProductAction = action.parse()?;
        let ids = dedupe_ids(ids);
        if ids.is_empty() {
            return Err(AppError::Validation("No product ids supplied".to_string()));
        }

        let columns = review_columns(&ReviewDecision::new(action.target(), reason))?;
        let matched = self.product_repo.count_by_ids(&ids).await?;
        let modified = self.product_repo.review_many(&ids, columns).await?;

        info!(requested = ids.len(), matched, modified, action = ?action, "Bulk product review");
        Ok(BulkReviewResult { matched, modified })
    }

    /// Edit allowed fields.
    ///
    /// `isPublic: true` is only accepted for approved products.
    pub async fn patch(&self, id: &str, patch: ProductPatch) -> AppResult<product::Model> {
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        let product = self.product_repo.get_by_id(id).await?;
        if patch.is_public == Some(true)
            && product.approval_status != ProductApprovalStatus::Approved
        {
            return Err(AppError::Validation(
                "Only approved products can be made public".to_string(),
            ));
        }
        if patch.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(AppError::Validation("Price must be a non-negative number".to_string()));
        }

        let mut active = product.into_active_model();
        if let Some(title) = patch.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(price) = patch.price {
            active.price = Set(price);
        }
        if let Some(stock) = patch.stock {
            active.stock = Set(stock.max(0));
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(categories) = patch.categories {
            active.categories = Set(string_array(categories));
        }
        if let Some(sku) = patch.sku {
            active.sku = Set(sku.trim().to_string());
        }
        if let Some(is_public) = patch.is_public {
            active.is_public = Set(is_public);
        }
        active.updated_at = Set(Some(Utc::now().into()));
        self.product_repo.update(active).await
    }

    /// Delete a product.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.product_repo.delete(id).await? {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

fn review_columns(decision: &ReviewDecision) -> AppResult<ProductReviewColumns> {
    let stamps = decision.stamps(Default::default());
    Ok(ProductReviewColumns {
        approval_status: ProductApprovalStatus::try_from(decision.target)?,
        approved_at: stamps.approved_at.map(Into::into),
        approval_reason: decision.reason.clone(),
        is_public: decision.is_public(),
        updated_at: decision.decided_at.into(),
    })
}

/// Trimmed, non-empty, first occurrence wins.
fn dedupe_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

fn string_array(items: Vec<String>) -> Value {
    Value::Array(
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Value::String)
            .collect(),
    )
}

/// Accept numbers or numeric strings. Anything else is 0.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = lenient_f64(deserializer)?;
    Ok(value.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}
