//! Paused pipeline state, resumed on a later request

use chrono::Utc;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pixelpin_auth_partial")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, column_type = "String(StringLen::N(32))")]
    pub token: String,
    pub next_step: i32,
    #[sea_orm(column_type = "String(StringLen::N(32))")]
    pub backend: String,
    pub data: Json,
    pub timestamp: chrono::DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
