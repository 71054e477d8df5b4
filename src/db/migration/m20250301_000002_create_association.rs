use sea_orm_migration::prelude::*;

use crate::constants::{
    ASSOCIATION_HANDLE_LENGTH, ASSOCIATION_SECRET_LENGTH, ASSOCIATION_TYPE_LENGTH,
    NONCE_SERVER_URL_LENGTH,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PixelpinAuthAssociation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PixelpinAuthAssociation::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthAssociation::ServerUrl)
                            .string_len(NONCE_SERVER_URL_LENGTH)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthAssociation::Handle)
                            .string_len(ASSOCIATION_HANDLE_LENGTH)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthAssociation::Secret)
                            .string_len(ASSOCIATION_SECRET_LENGTH)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthAssociation::Issued)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthAssociation::Lifetime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PixelpinAuthAssociation::AssocType)
                            .string_len(ASSOCIATION_TYPE_LENGTH)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One association per handle and provider endpoint
        manager
            .create_index(
                Index::create()
                    .name("idx_pixelpin_auth_association_unique")
                    .table(PixelpinAuthAssociation::Table)
                    .col(PixelpinAuthAssociation::ServerUrl)
                    .col(PixelpinAuthAssociation::Handle)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(PixelpinAuthAssociation::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum PixelpinAuthAssociation {
    Table,
    Id,
    ServerUrl,
    Handle,
    Secret,
    Issued,
    Lifetime,
    AssocType,
}
