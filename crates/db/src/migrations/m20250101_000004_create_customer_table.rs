//! Create customer table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn text(col: Customer) -> ColumnDef {
    ColumnDef::new(col)
        .string_len(256)
        .not_null()
        .default("")
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customer::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Customer::FullName).string_len(256).not_null())
                    .col(text(Customer::FirstName))
                    .col(text(Customer::LastName))
                    .col(ColumnDef::new(Customer::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Customer::Password).string_len(256).not_null())
                    .col(text(Customer::Mobile))
                    .col(ColumnDef::new(Customer::Address).text().not_null().default(""))
                    .col(text(Customer::City))
                    .col(text(Customer::State))
                    .col(
                        ColumnDef::new(Customer::Country)
                            .string_len(128)
                            .not_null()
                            .default("India"),
                    )
                    .col(text(Customer::Pincode))
                    .col(text(Customer::Gender))
                    .col(text(Customer::Dob))
                    .col(ColumnDef::new(Customer::CustomerOwnCode).string_len(32).not_null())
                    .col(text(Customer::ReferralCodeUsed))
                    .col(ColumnDef::new(Customer::ReferredBy).string_len(32))
                    .col(
                        ColumnDef::new(Customer::AgreeToTerms)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Customer::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Customer::StatusReason).text().not_null().default(""))
                    .col(ColumnDef::new(Customer::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Customer::SuspendedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Customer::IsEmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Customer::LastLoginAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Customer::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Customer::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_referred_by")
                            .from(Customer::Table, Customer::ReferredBy)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: email (stored lowercase)
        manager
            .create_index(
                Index::create()
                    .name("idx_customer_email")
                    .table(Customer::Table)
                    .col(Customer::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: customer_own_code
        manager
            .create_index(
                Index::create()
                    .name("idx_customer_own_code")
                    .table(Customer::Table)
                    .col(Customer::CustomerOwnCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: mobile (login by phone)
        manager
            .create_index(
                Index::create()
                    .name("idx_customer_mobile")
                    .table(Customer::Table)
                    .col(Customer::Mobile)
                    .to_owned(),
            )
            .await?;

        // Index: (status, created_at) for the admin list
        manager
            .create_index(
                Index::create()
                    .name("idx_customer_status_created_at")
                    .table(Customer::Table)
                    .col(Customer::Status)
                    .col(Customer::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customer::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Customer {
    Table,
    Id,
    FullName,
    FirstName,
    LastName,
    Email,
    Password,
    Mobile,
    Address,
    City,
    State,
    Country,
    Pincode,
    Gender,
    Dob,
    CustomerOwnCode,
    ReferralCodeUsed,
    ReferredBy,
    AgreeToTerms,
    Status,
    StatusReason,
    ApprovedAt,
    SuspendedAt,
    IsEmailVerified,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}
