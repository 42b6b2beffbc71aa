//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::Email).string_len(320).not_null())
                    .col(ColumnDef::new(User::Nickname).string_len(64).not_null())
                    .col(ColumnDef::new(User::PasswordHash).string_len(256).not_null())
                    .col(
                        ColumnDef::new(User::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(User::EmailVerified).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(User::TwoFactorEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(User::NotificationsEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(User::Suspended).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::SuspendedReason).text())
                    .col(ColumnDef::new(User::SuspendedAppeal).text())
                    .col(ColumnDef::new(User::DeletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(User::ReactivatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_nickname")
                    .table(User::Table)
                    .col(User::Nickname)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Sweeper scans pending soft deletes
        manager
            .create_index(
                Index::create()
                    .name("idx_user_deleted_at")
                    .table(User::Table)
                    .col(User::DeletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum User {
    Table,
    Id,
    Email,
    Nickname,
    PasswordHash,
    Role,
    EmailVerified,
    TwoFactorEnabled,
    NotificationsEnabled,
    Suspended,
    SuspendedReason,
    SuspendedAppeal,
    DeletedAt,
    ReactivatedAt,
    CreatedAt,
    UpdatedAt,
}
