//! Create admin table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Admin::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Admin::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Admin::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Admin::Password).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Admin::Role)
                            .string_len(32)
                            .not_null()
                            .default("admin"),
                    )
                    .col(ColumnDef::new(Admin::ReferralCode).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Admin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Admin::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_email")
                    .table(Admin::Table)
                    .col(Admin::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_referral_code")
                    .table(Admin::Table)
                    .col(Admin::ReferralCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Admin::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Admin {
    Table,
    Id,
    Name,
    Email,
    Password,
    Role,
    ReferralCode,
    CreatedAt,
    UpdatedAt,
}
