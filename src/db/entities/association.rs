//! OpenID provider association entity model

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sea_orm::entity::prelude::*;

use crate::error::PixelpinAuthError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pixelpin_auth_association")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub server_url: String,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub handle: String,
    /// Base64 of the shared secret.
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub secret: String,
    pub issued: i64,
    pub lifetime: i64,
    #[sea_orm(column_type = "String(StringLen::N(64))")]
    pub assoc_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn expires_at(&self) -> i64 {
        self.issued.saturating_add(self.lifetime)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at() <= now
    }

    pub fn secret_bytes(&self) -> Result<Vec<u8>, PixelpinAuthError> {
        Ok(STANDARD.decode(self.secret.trim())?)
    }
}
