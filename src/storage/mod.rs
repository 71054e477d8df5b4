//! Storage backend handed to the authentication pipeline.
//!
//! [PixelpinStorage] aggregates one store per entity. Stores borrow the
//! persistence session for the duration of a call, so any SeaORM connection or
//! transaction can be passed in and the caller keeps control of commit/rollback.

mod association;
mod code;
mod nonce;
mod partial;
mod user;

pub use association::{AssociationStore, OpenIdAssociation};
pub use code::CodeStore;
pub use nonce::NonceStore;
pub use partial::{PartialData, PartialPipeline, PartialStore};
pub use user::{UserSocialAuth, UserStore};

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::info;

use crate::db::run_migrations;
use crate::error::PixelpinAuthError;
use crate::schema::Schema;

#[derive(Clone, Debug)]
pub struct PixelpinStorage {
    schema: Arc<Schema>,
}

impl PixelpinStorage {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn user<'a, C: ConnectionTrait>(&'a self, conn: &'a C) -> UserStore<'a, C> {
        UserStore::new(conn, &self.schema)
    }

    pub fn nonce<'a, C: ConnectionTrait>(&self, conn: &'a C) -> NonceStore<'a, C> {
        NonceStore::new(conn)
    }

    pub fn association<'a, C: ConnectionTrait>(&self, conn: &'a C) -> AssociationStore<'a, C> {
        AssociationStore::new(conn)
    }

    pub fn code<'a, C: ConnectionTrait>(&self, conn: &'a C) -> CodeStore<'a, C> {
        CodeStore::new(conn)
    }

    pub fn partial<'a, C: ConnectionTrait>(&self, conn: &'a C) -> PartialStore<'a, C> {
        PartialStore::new(conn)
    }

    /// Create every storage table. The host user table must already exist.
    pub async fn migrate(&self, db: &DatabaseConnection) -> Result<(), PixelpinAuthError> {
        run_migrations(db).await?;
        self.schema.create_tables(db).await?;
        info!("Pixelpin auth storage tables ready");
        Ok(())
    }
}

fn check_length(field: &'static str, value: &str, max: u32) -> Result<(), PixelpinAuthError> {
    let length = value.chars().count();
    if length > max as usize {
        return Err(PixelpinAuthError::FieldTooLong { field, length, max });
    }
    Ok(())
}
