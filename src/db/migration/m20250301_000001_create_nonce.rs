use sea_orm_migration::prelude::*;

use crate::constants::{NONCE_SALT_LENGTH, NONCE_SERVER_URL_LENGTH};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PixelpinAuthNonce::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PixelpinAuthNonce::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthNonce::ServerUrl)
                            .string_len(NONCE_SERVER_URL_LENGTH)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthNonce::Timestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthNonce::Salt)
                            .string_len(NONCE_SALT_LENGTH)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // A nonce may only be recorded once
        manager
            .create_index(
                Index::create()
                    .name("idx_pixelpin_auth_nonce_unique")
                    .table(PixelpinAuthNonce::Table)
                    .col(PixelpinAuthNonce::ServerUrl)
                    .col(PixelpinAuthNonce::Timestamp)
                    .col(PixelpinAuthNonce::Salt)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Cleanup scans by timestamp
        manager
            .create_index(
                Index::create()
                    .name("idx_pixelpin_auth_nonce_timestamp")
                    .table(PixelpinAuthNonce::Table)
                    .col(PixelpinAuthNonce::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PixelpinAuthNonce::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PixelpinAuthNonce {
    Table,
    Id,
    ServerUrl,
    Timestamp,
    Salt,
}
