use sea_orm_migration::prelude::*;

use crate::constants::{PARTIAL_BACKEND_LENGTH, PARTIAL_TOKEN_LENGTH};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PixelpinAuthPartial::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PixelpinAuthPartial::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthPartial::Token)
                            .string_len(PARTIAL_TOKEN_LENGTH)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthPartial::NextStep)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthPartial::Backend)
                            .string_len(PARTIAL_BACKEND_LENGTH)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PixelpinAuthPartial::Data).json().not_null())
                    .col(
                        ColumnDef::new(PixelpinAuthPartial::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pixelpin_auth_partial_token")
                    .table(PixelpinAuthPartial::Table)
                    .col(PixelpinAuthPartial::Token)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PixelpinAuthPartial::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PixelpinAuthPartial {
    Table,
    Id,
    Token,
    NextStep,
    Backend,
    Data,
    Timestamp,
}
