//! Create asset and cash_flow tables.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Asset::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Asset::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Asset::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Asset::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Asset::Name).string_len(400).not_null())
                    .col(ColumnDef::new(Asset::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Asset::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_user")
                            .from(Asset::Table, Asset::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_asset_user_id")
                    .table(Asset::Table)
                    .col(Asset::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CashFlow::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CashFlow::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(CashFlow::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(CashFlow::Title).string_len(400).not_null())
                    .col(ColumnDef::new(CashFlow::Amount).big_integer().not_null())
                    .col(ColumnDef::new(CashFlow::DayOfMonth).integer().not_null())
                    .col(
                        ColumnDef::new(CashFlow::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cash_flow_user")
                            .from(CashFlow::Table, CashFlow::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cash_flow_user_id")
                    .table(CashFlow::Table)
                    .col(CashFlow::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CashFlow::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Asset::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Asset {
    Table,
    Id,
    UserId,
    Kind,
    Name,
    Amount,
    CreatedAt,
}

#[derive(Iden)]
enum CashFlow {
    Table,
    Id,
    UserId,
    Title,
    Amount,
    DayOfMonth,
    CreatedAt,
}
