//! Create inquiry and inquiry_answer tables.

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
                    .table(Inquiry::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Inquiry::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Inquiry::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Inquiry::Title).string_len(400).not_null())
                    .col(ColumnDef::new(Inquiry::Content).text().not_null())
                    .col(
                        ColumnDef::new(Inquiry::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Inquiry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inquiry_user")
                            .from(Inquiry::Table, Inquiry::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inquiry_user_id")
                    .table(Inquiry::Table)
                    .col(Inquiry::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inquiry_status")
                    .table(Inquiry::Table)
                    .col(Inquiry::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InquiryAnswer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InquiryAnswer::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InquiryAnswer::InquiryId).string_len(32).not_null())
                    .col(ColumnDef::new(InquiryAnswer::AdminId).string_len(32).not_null())
                    .col(ColumnDef::new(InquiryAnswer::Content).text().not_null())
                    .col(
                        ColumnDef::new(InquiryAnswer::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inquiry_answer_inquiry")
                            .from(InquiryAnswer::Table, InquiryAnswer::InquiryId)
                            .to(Inquiry::Table, Inquiry::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inquiry_answer_inquiry_id")
                    .table(InquiryAnswer::Table)
                    .col(InquiryAnswer::InquiryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InquiryAnswer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inquiry::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Inquiry {
    Table,
    Id,
    UserId,
    Title,
    Content,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum InquiryAnswer {
    Table,
    Id,
    InquiryId,
    AdminId,
    Content,
    CreatedAt,
}
