//! Description of the host application's user entity.
//!
//! The association table points at a user table this crate does not own. All it
//! needs from that table is an `id` column (whose type the foreign key copies) and a
//! `username` column (whose length bounds generated usernames), plus optionally an
//! email column for lookups.

use std::collections::HashMap;

use sea_orm::sea_query::{ColumnType, StringLen};
use sea_orm::{ColumnTrait, EntityTrait, IdenStatic};
use tracing::debug;

use crate::error::PixelpinAuthError;

/// Capabilities the storage needs from a host user entity.
pub trait HostUser: EntityTrait {
    fn id_column() -> Self::Column;

    fn username_column() -> Self::Column;

    fn email_column() -> Option<Self::Column> {
        None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserModelDescriptor {
    pub table: String,
    pub id_column: String,
    pub id_type: ColumnType,
    pub username_column: String,
    pub username_type: ColumnType,
    pub email_column: Option<String>,
}

impl UserModelDescriptor {
    pub fn of<U: HostUser>() -> Self {
        let id = U::id_column();
        let username = U::username_column();
        Self {
            table: U::default().table_name().to_string(),
            id_column: id.as_str().to_string(),
            id_type: id.def().get_column_type().clone(),
            username_column: username.as_str().to_string(),
            username_type: username.def().get_column_type().clone(),
            email_column: U::email_column().map(|column| column.as_str().to_string()),
        }
    }

    /// Length of the username column, `None` when the column is unbounded.
    pub fn username_max_length(&self) -> Option<u32> {
        match &self.username_type {
            ColumnType::String(StringLen::N(length)) => Some(*length),
            ColumnType::Char(length) => *length,
            _ => None,
        }
    }
}

/// Name-keyed lookup for host user models, so the `USER_MODEL` setting can name one.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, UserModelDescriptor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<U: HostUser>(&mut self, name: impl Into<String>) -> &mut Self {
        self.register_descriptor(name, UserModelDescriptor::of::<U>())
    }

    pub fn register_descriptor(
        &mut self,
        name: impl Into<String>,
        descriptor: UserModelDescriptor,
    ) -> &mut Self {
        let name = name.into();
        debug!(name = %name, table = %descriptor.table, "Registered user model");
        self.models.insert(name, descriptor);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<&UserModelDescriptor, PixelpinAuthError> {
        self.models
            .get(name)
            .ok_or_else(|| PixelpinAuthError::UserModelNotResolvable(name.to_string()))
    }
}
