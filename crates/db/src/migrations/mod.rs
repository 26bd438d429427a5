//! Database migrations.
//!
//! Schema migrations for the marketplace database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_admin_table;
mod m20250101_000002_create_seller_table;
mod m20250101_000003_create_product_table;
mod m20250101_000004_create_customer_table;
mod m20250101_000005_create_contact_message_table;
mod m20250101_000006_create_category_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_admin_table::Migration),
            Box::new(m20250101_000002_create_seller_table::Migration),
            Box::new(m20250101_000003_create_product_table::Migration),
            Box::new(m20250101_000004_create_customer_table::Migration),
            Box::new(m20250101_000005_create_contact_message_table::Migration),
            Box::new(m20250101_000006_create_category_table::Migration),
        ]
    }
}
