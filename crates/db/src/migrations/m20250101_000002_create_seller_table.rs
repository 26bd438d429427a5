//! Create seller table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn text(col: Seller) -> ColumnDef {
    ColumnDef::new(col)
        .string_len(256)
        .not_null()
        .default("")
        .to_owned()
}

fn long_text(col: Seller) -> ColumnDef {
    ColumnDef::new(col).text().not_null().default("").to_owned()
}

fn document(col: Seller) -> ColumnDef {
    ColumnDef::new(col)
        .json_binary()
        .not_null()
        .default(Expr::cust("'{}'::jsonb"))
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Seller::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Seller::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Seller::FirstName).string_len(128).not_null())
                    .col(text(Seller::LastName))
                    .col(ColumnDef::new(Seller::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Seller::Password).string_len(256).not_null())
                    .col(text(Seller::Phone))
                    .col(text(Seller::DateOfBirth))
                    .col(ColumnDef::new(Seller::ReferralCode).string_len(32).not_null())
                    .col(text(Seller::ReferredBy))
                    // Agreement
                    .col(
                        ColumnDef::new(Seller::AgreementVersion)
                            .string_len(16)
                            .not_null()
                            .default("v1.0"),
                    )
                    .col(
                        ColumnDef::new(Seller::IsAgreementUploaded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(long_text(Seller::SignedAgreementUrl))
                    .col(ColumnDef::new(Seller::AgreementUploadedAt).timestamp_with_time_zone())
                    .col(document(Seller::AdminAgreementApproval))
                    // Business
                    .col(text(Seller::BusinessName))
                    .col(text(Seller::BusinessType))
                    .col(text(Seller::BusinessRegNumber))
                    .col(text(Seller::TaxId))
                    .col(long_text(Seller::BusinessAddress))
                    .col(text(Seller::City))
                    .col(text(Seller::State))
                    .col(text(Seller::ZipCode))
                    .col(text(Seller::Country))
                    .col(text(Seller::NatureOfConcern))
                    .col(text(Seller::FirmName))
                    .col(text(Seller::NameAsPerPan))
                    .col(
                        ColumnDef::new(Seller::HasGst)
                            .string_len(8)
                            .not_null()
                            .default("No"),
                    )
                    .col(text(Seller::GstNumber))
                    .col(long_text(Seller::GstFile))
                    .col(document(Seller::Proprietorship))
                    .col(document(Seller::Partnership))
                    .col(document(Seller::Llp))
                    .col(document(Seller::PrivateLimited))
                    .col(document(Seller::PublicLimited))
                    .col(document(Seller::Store))
                    .col(document(Seller::Pickup))
                    .col(document(Seller::Documents))
                    .col(document(Seller::Bank))
                    .col(
                        ColumnDef::new(Seller::TermsAccepted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // Review
                    .col(
                        ColumnDef::new(Seller::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(long_text(Seller::ApprovalReason))
                    .col(long_text(Seller::StatusReason))
                    .col(ColumnDef::new(Seller::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Seller::SuspendedAt).timestamp_with_time_zone())
                    // Password reset
                    .col(ColumnDef::new(Seller::ResetPasswordToken).string_len(64))
                    .col(ColumnDef::new(Seller::ResetPasswordExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Seller::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Seller::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: email (stored lowercase)
        manager
            .create_index(
                Index::create()
                    .name("idx_seller_email")
                    .table(Seller::Table)
                    .col(Seller::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: referral_code
        manager
            .create_index(
                Index::create()
                    .name("idx_seller_referral_code")
                    .table(Seller::Table)
                    .col(Seller::ReferralCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: reset token lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_seller_reset_password_token")
                    .table(Seller::Table)
                    .col(Seller::ResetPasswordToken)
                    .to_owned(),
            )
            .await?;

        // Index: (status, created_at) for the admin list
        manager
            .create_index(
                Index::create()
                    .name("idx_seller_status_created_at")
                    .table(Seller::Table)
                    .col(Seller::Status)
                    .col(Seller::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Seller::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Seller {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Password,
    Phone,
    DateOfBirth,
    ReferralCode,
    ReferredBy,
    AgreementVersion,
    IsAgreementUploaded,
    SignedAgreementUrl,
    AgreementUploadedAt,
    AdminAgreementApproval,
    BusinessName,
    BusinessType,
    BusinessRegNumber,
    TaxId,
    BusinessAddress,
    City,
    State,
    ZipCode,
    Country,
    NatureOfConcern,
    FirmName,
    NameAsPerPan,
    HasGst,
    GstNumber,
    GstFile,
    Proprietorship,
    Partnership,
    Llp,
    PrivateLimited,
    PublicLimited,
    Store,
    Pickup,
    Documents,
    Bank,
    TermsAccepted,
    Status,
    ApprovalReason,
    StatusReason,
    ApprovedAt,
    SuspendedAt,
    ResetPasswordToken,
    ResetPasswordExpiresAt,
    CreatedAt,
    UpdatedAt,
}
