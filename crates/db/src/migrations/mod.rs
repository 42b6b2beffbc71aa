//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_verification_token_table;
mod m20250601_000003_create_board_tables;
mod m20250601_000004_create_report_table;
mod m20250601_000005_create_inquiry_tables;
mod m20250601_000006_create_finance_tables;
mod m20250601_000007_create_push_subscription_table;

/// Migrator for running all migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_verification_token_table::Migration),
            Box::new(m20250601_000003_create_board_tables::Migration),
            Box::new(m20250601_000004_create_report_table::Migration),
            Box::new(m20250601_000005_create_inquiry_tables::Migration),
            Box::new(m20250601_000006_create_finance_tables::Migration),
            Box::new(m20250601_000007_create_push_subscription_table::Migration),
        ]
    }
}
