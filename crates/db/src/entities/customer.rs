//! Customer entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account status of a customer.
///
/// An approved customer is stored as `active`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CustomerStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

/// Registered customer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub full_name: String,
    /// First word of `full_name`.
    pub first_name: String,
    /// Remainder of `full_name`.
    pub last_name: String,

    /// Always stored lowercase.
    #[sea_orm(unique)]
    pub email: String,

    #[serde(skip_serializing)]
    pub password: String,

    /// `+91XXXXXXXXXX` when a bare national number was supplied.
    pub mobile: String,

    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
    pub gender: String,
    pub dob: String,

    #[sea_orm(unique)]
    pub customer_own_code: String,
    pub referral_code_used: String,
    /// Customer whose code was used at signup.
    #[sea_orm(nullable)]
    pub referred_by: Option<String>,
    pub agree_to_terms: bool,

    pub status: CustomerStatus,
    #[sea_orm(column_type = "Text")]
    pub status_reason: String,
    #[sea_orm(nullable)]
    pub approved_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(nullable)]
    pub suspended_at: Option<DateTimeWithTimeZone>,

    pub is_email_verified: bool,
    #[sea_orm(nullable)]
    pub last_login_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ReferredBy",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Referrer,
}

impl ActiveModelBehavior for ActiveModel {}
