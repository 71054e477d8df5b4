//! One-use numbers for OpenID replay protection

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pixelpin_auth_nonce")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub server_url: String,
    /// Unix timestamp (seconds) supplied by the provider.
    pub timestamp: i64,
    #[sea_orm(column_type = "String(StringLen::N(40))")]
    pub salt: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
