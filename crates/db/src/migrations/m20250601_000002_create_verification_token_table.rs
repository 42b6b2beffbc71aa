//! Create verification_token table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationToken::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationToken::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VerificationToken::Identifier)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerificationToken::Token).string_len(64).not_null())
                    .col(
                        ColumnDef::new(VerificationToken::Expires)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_verification_token_token")
                    .table(VerificationToken::Table)
                    .col(VerificationToken::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_verification_token_identifier")
                    .table(VerificationToken::Table)
                    .col(VerificationToken::Identifier)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationToken::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VerificationToken {
    Table,
    Id,
    Identifier,
    Token,
    Expires,
}
