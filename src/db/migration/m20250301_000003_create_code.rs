use sea_orm_migration::prelude::*;

use crate::constants::{CODE_EMAIL_LENGTH, CODE_LENGTH};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PixelpinAuthCode::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PixelpinAuthCode::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthCode::Email)
                            .string_len(CODE_EMAIL_LENGTH)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthCode::Code)
                            .string_len(CODE_LENGTH)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthCode::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthCode::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pixelpin_auth_code_unique")
                    .table(PixelpinAuthCode::Table)
                    .col(PixelpinAuthCode::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pixelpin_auth_code_email")
                    .table(PixelpinAuthCode::Table)
                    .col(PixelpinAuthCode::Email)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PixelpinAuthCode::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PixelpinAuthCode {
    Table,
    Id,
    Email,
    Code,
    Verified,
    CreatedAt,
}
