//! Product entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a product listing.
///
/// Serialized capitalized, unlike seller and customer statuses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
pub enum ProductApprovalStatus {
    #[sea_orm(string_value = "Pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

/// Product submitted by a seller.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub seller_id: String,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub stock: i32,
    pub sku: String,

    /// JSON array of category names.
    #[sea_orm(column_type = "JsonBinary")]
    pub categories: Json,
    /// JSON array of image URLs.
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,

    pub approval_status: ProductApprovalStatus,
    #[sea_orm(nullable)]
    pub approved_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text")]
    pub approval_reason: String,

    /// Only ever true while `approval_status` is approved.
    pub is_public: bool,

    // Seller info cached for admin search
    pub seller_business_name: String,
    pub seller_email: String,
    pub seller_phone: String,

    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seller::Entity",
        from = "Column::SellerId",
        to = "super::seller::Column::Id",
        on_delete = "Cascade"
    )]
    Seller,
}

impl Related<super::seller::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
