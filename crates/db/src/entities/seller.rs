//! Seller entity.
//!
//! Business-type specific details are stored as typed JSON documents so every
//! seller row carries the same shape regardless of which sections were filled in.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a seller account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum SellerStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

/// Status of the admin review of a seller's signed agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgreementStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Admin review of the signed agreement, independent of the account status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct AgreementApproval {
    pub status: AgreementStatus,
    pub approved_by: String,
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub remarks: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct ProprietorshipDetails {
    pub name: String,
    pub dob: String,
    pub pan: String,
    pub aadhaar: String,
    pub mobile: String,
    pub email: String,
    pub address: String,
    pub pan_card: String,
    pub aadhaar_card: String,
    pub photo: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct PartnershipDetails {
    pub number_of_partners: i32,
    pub partners: Vec<Json>,
    pub deed_date: String,
    pub pan: String,
    pub deed: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct LlpDetails {
    pub name: String,
    pub registration_no: String,
    pub pan: String,
    pub incorporation_date: String,
    pub number_of_designated_partners: i32,
    pub designated_partners: Vec<Json>,
    pub certificate: String,
    pub agreement: String,
}

/// Shared shape for private and public limited companies.
///
/// `listed_status` and `stock_exchange` are only meaningful for public companies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyDetails {
    pub name: String,
    pub cin_number: String,
    pub pan: String,
    pub incorporation_date: String,
    pub authorized_capital: String,
    pub paid_up_capital: String,
    pub number_of_directors: i32,
    pub directors: Vec<Json>,
    pub incorporation_certificate: String,
    pub moa_document: String,
    pub aoa_document: String,
    pub listed_status: String,
    pub stock_exchange: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreDetails {
    pub gstin: String,
    pub pan: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub categories: Vec<String>,
    pub logo: String,
    pub banner: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct PickupDetails {
    pub address: String,
    pub pincode: String,
    pub contact: String,
    pub esignature: String,
    pub address_proof: String,
    pub photo_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessDocuments {
    pub business_license: String,
    pub tax_certificate: String,
    pub identity_proof: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub routing_number: String,
    pub account_type: String,
    pub branch_name: String,
    pub ifsc_code: String,
    pub statement: String,
}

/// Registered seller.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seller")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,
    pub last_name: String,

    /// Always stored lowercase.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 hash.
    #[serde(skip_serializing)]
    pub password: String,

    pub phone: String,
    pub date_of_birth: String,

    /// This seller's own referral code.
    #[sea_orm(unique)]
    pub referral_code: String,
    /// Referral code of whoever referred this seller.
    pub referred_by: String,

    // Agreement
    pub agreement_version: String,
    pub is_agreement_uploaded: bool,
    pub signed_agreement_url: String,
    #[sea_orm(nullable)]
    pub agreement_uploaded_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "JsonBinary")]
    pub admin_agreement_approval: AgreementApproval,

    // Business
    pub business_name: String,
    pub business_type: String,
    pub business_reg_number: String,
    pub tax_id: String,
    #[sea_orm(column_type = "Text")]
    pub business_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub nature_of_concern: String,
    pub firm_name: String,
    pub name_as_per_pan: String,
    pub has_gst: String,
    pub gst_number: String,
    pub gst_file: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub proprietorship: ProprietorshipDetails,
    #[sea_orm(column_type = "JsonBinary")]
    pub partnership: PartnershipDetails,
    #[sea_orm(column_type = "JsonBinary")]
    pub llp: LlpDetails,
    #[sea_orm(column_type = "JsonBinary")]
    pub private_limited: CompanyDetails,
    #[sea_orm(column_type = "JsonBinary")]
    pub public_limited: CompanyDetails,
    #[sea_orm(column_type = "JsonBinary")]
    pub store: StoreDetails,
    #[sea_orm(column_type = "JsonBinary")]
    pub pickup: PickupDetails,
    #[sea_orm(column_type = "JsonBinary")]
    pub documents: BusinessDocuments,
    #[sea_orm(column_type = "JsonBinary")]
    pub bank: BankDetails,

    pub terms_accepted: bool,

    // Review
    pub status: SellerStatus,
    #[sea_orm(column_type = "Text")]
    pub approval_reason: String,
    #[sea_orm(column_type = "Text")]
    pub status_reason: String,
    #[sea_orm(nullable)]
    pub approved_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(nullable)]
    pub suspended_at: Option<DateTimeWithTimeZone>,

    /// SHA-256 hex of the emailed reset token.
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub reset_password_expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
