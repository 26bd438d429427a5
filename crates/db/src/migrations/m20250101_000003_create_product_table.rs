//! Create product table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Product::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Product::SellerId).string_len(32).not_null())
                    .col(ColumnDef::new(Product::Title).string_len(512).not_null().default(""))
                    .col(ColumnDef::new(Product::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Product::Price).double().not_null().default(0.0))
                    .col(ColumnDef::new(Product::Stock).integer().not_null().default(0))
                    .col(ColumnDef::new(Product::Sku).string_len(128).not_null().default(""))
                    .col(
                        ColumnDef::new(Product::Categories)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Product::Images)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Product::ApprovalStatus)
                            .string_len(16)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Product::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Product::ApprovalReason).text().not_null().default(""))
                    .col(ColumnDef::new(Product::IsPublic).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Product::SellerBusinessName)
                            .string_len(256)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Product::SellerEmail)
                            .string_len(320)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Product::SellerPhone)
                            .string_len(32)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Product::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Product::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_seller_id")
                            .from(Product::Table, Product::SellerId)
                            .to(Seller::Table, Seller::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: seller_id (seller dashboard)
        manager
            .create_index(
                Index::create()
                    .name("idx_product_seller_id")
                    .table(Product::Table)
                    .col(Product::SellerId)
                    .to_owned(),
            )
            .await?;

        // Index: (approval_status, created_at) for the review queue
        manager
            .create_index(
                Index::create()
                    .name("idx_product_approval_status_created_at")
                    .table(Product::Table)
                    .col(Product::ApprovalStatus)
                    .col(Product::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: (is_public, created_at) for the public catalog
        manager
            .create_index(
                Index::create()
                    .name("idx_product_is_public_created_at")
                    .table(Product::Table)
                    .col(Product::IsPublic)
                    .col(Product::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Product::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Product {
    Table,
    Id,
    SellerId,
    Title,
    Description,
    Price,
    Stock,
    Sku,
    Categories,
    Images,
    ApprovalStatus,
    ApprovedAt,
    ApprovalReason,
    IsPublic,
    SellerBusinessName,
    SellerEmail,
    SellerPhone,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Seller {
    Table,
    Id,
}
