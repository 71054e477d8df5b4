//! Schema of the user-auth association table.
//!
//! Unlike the other four tables, its shape depends on the host: the `uid` length
//! comes from configuration and the `user_id` foreign key copies the host user id
//! column type. [SchemaBuilder] takes both as inputs and produces a complete
//! [Schema], which then generates the DDL and backs [crate::storage::UserStore].

use std::fmt;

use sea_orm::sea_query::{
    Alias, ColumnDef, ColumnType, ForeignKey, ForeignKeyAction, Iden, Index, IndexCreateStatement,
    StringLen, Table, TableCreateStatement,
};
use sea_orm::{ConnectionTrait, DbErr, DeriveIden, QueryResult, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::constants::{DEFAULT_UID_LENGTH, PROVIDER_LENGTH};
use crate::error::PixelpinAuthError;
use crate::user_model::{HostUser, UserModelDescriptor};

#[derive(DeriveIden)]
pub(crate) enum PixelpinAuthUserAuth {
    Table,
    Id,
    Provider,
    Uid,
    UserId,
    ExtraData,
}

/// A host user id, in whichever of the supported families the host id column uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UserId {
    Integer(i64),
    Text(String),
    Uuid(Uuid),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Integer(id) => write!(f, "{id}"),
            UserId::Text(id) => f.write_str(id),
            UserId::Uuid(id) => write!(f, "{id}"),
        }
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        UserId::Integer(id.into())
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Integer(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId::Text(id)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        UserId::Uuid(id)
    }
}

/// Storage family of the host id column, decides how ids are bound and decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserIdKind {
    SmallInteger,
    Integer,
    BigInteger,
    Text,
    Uuid,
}

impl UserIdKind {
    pub fn from_column_type(column_type: &ColumnType) -> Result<Self, PixelpinAuthError> {
        match column_type {
            ColumnType::TinyInteger | ColumnType::SmallInteger => Ok(UserIdKind::SmallInteger),
            ColumnType::Integer => Ok(UserIdKind::Integer),
            ColumnType::BigInteger => Ok(UserIdKind::BigInteger),
            ColumnType::String(_) | ColumnType::Char(_) | ColumnType::Text => Ok(UserIdKind::Text),
            ColumnType::Uuid => Ok(UserIdKind::Uuid),
            other => Err(PixelpinAuthError::UnsupportedUserIdType(format!(
                "{other:?}"
            ))),
        }
    }

    /// Convert an id to a query value matching the column width.
    pub fn to_value(self, id: &UserId) -> Result<Value, PixelpinAuthError> {
        match (self, id) {
            (UserIdKind::SmallInteger, UserId::Integer(value)) => i16::try_from(*value)
                .map(Value::from)
                .map_err(|_| PixelpinAuthError::InvalidUserId(format!("{value} overflows smallint"))),
            (UserIdKind::Integer, UserId::Integer(value)) => i32::try_from(*value)
                .map(Value::from)
                .map_err(|_| PixelpinAuthError::InvalidUserId(format!("{value} overflows integer"))),
            (UserIdKind::BigInteger, UserId::Integer(value)) => Ok(Value::from(*value)),
            (UserIdKind::Text, UserId::Text(value)) => Ok(Value::from(value.clone())),
            (UserIdKind::Uuid, UserId::Uuid(value)) => Ok(Value::from(*value)),
            (UserIdKind::Uuid, UserId::Text(value)) => Uuid::parse_str(value)
                .map(Value::from)
                .map_err(|e| PixelpinAuthError::InvalidUserId(e.to_string())),
            (kind, id) => Err(PixelpinAuthError::InvalidUserId(format!(
                "{id:?} does not fit a {kind:?} user id column"
            ))),
        }
    }

    pub fn decode(self, row: &QueryResult, column: &str) -> Result<UserId, DbErr> {
        Ok(match self {
            UserIdKind::SmallInteger => UserId::Integer(row.try_get::<i16>("", column)?.into()),
            UserIdKind::Integer => UserId::Integer(row.try_get::<i32>("", column)?.into()),
            UserIdKind::BigInteger => UserId::Integer(row.try_get::<i64>("", column)?),
            UserIdKind::Text => UserId::Text(row.try_get::<String>("", column)?),
            UserIdKind::Uuid => UserId::Uuid(row.try_get::<Uuid>("", column)?),
        })
    }
}

/// Builds a [Schema] from configuration and the host user model.
#[derive(Clone, Debug)]
pub struct SchemaBuilder {
    uid_length: u32,
    user_model: Option<UserModelDescriptor>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self {
            uid_length: DEFAULT_UID_LENGTH,
            user_model: None,
        }
    }
}

impl SchemaBuilder {
    pub fn new(config: &StorageConfig) -> Self {
        Self::default().uid_length(config.uid_length)
    }

    pub fn uid_length(mut self, uid_length: u32) -> Self {
        self.uid_length = uid_length;
        self
    }

    pub fn user_model(mut self, descriptor: UserModelDescriptor) -> Self {
        self.user_model = Some(descriptor);
        self
    }

    pub fn host_user<U: HostUser>(self) -> Self {
        self.user_model(UserModelDescriptor::of::<U>())
    }

    pub fn build(self) -> Result<Schema, PixelpinAuthError> {
        let user_model = self.user_model.ok_or_else(|| {
            PixelpinAuthError::Configuration("no user model given to the schema builder".to_string())
        })?;
        if self.uid_length == 0 {
            return Err(PixelpinAuthError::Configuration(
                "uid length must be positive".to_string(),
            ));
        }
        let user_id_kind = UserIdKind::from_column_type(&user_model.id_type)?;
        debug!(
            uid_length = self.uid_length,
            user_table = %user_model.table,
            user_id_kind = ?user_id_kind,
            "Built user-auth schema"
        );
        Ok(Schema {
            uid_length: self.uid_length,
            user_model,
            user_id_kind,
        })
    }
}

/// Fully-defined shape of the user-auth association table.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    uid_length: u32,
    user_model: UserModelDescriptor,
    user_id_kind: UserIdKind,
}

impl Schema {
    pub fn table_name(&self) -> String {
        PixelpinAuthUserAuth::Table.to_string()
    }

    pub fn uid_length(&self) -> u32 {
        self.uid_length
    }

    pub fn uid_column_type(&self) -> ColumnType {
        ColumnType::String(StringLen::N(self.uid_length))
    }

    pub fn user_model(&self) -> &UserModelDescriptor {
        &self.user_model
    }

    /// Type of the `user_id` foreign key, identical to the host id column type.
    pub fn user_id_type(&self) -> &ColumnType {
        &self.user_model.id_type
    }

    pub fn user_id_kind(&self) -> UserIdKind {
        self.user_id_kind
    }

    pub fn username_max_length(&self) -> Option<u32> {
        self.user_model.username_max_length()
    }

    pub fn create_table_statement(&self) -> TableCreateStatement {
        Table::create()
            .table(PixelpinAuthUserAuth::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(PixelpinAuthUserAuth::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(PixelpinAuthUserAuth::Provider)
                    .string_len(PROVIDER_LENGTH)
                    .not_null(),
            )
            .col(
                ColumnDef::new(PixelpinAuthUserAuth::Uid)
                    .string_len(self.uid_length)
                    .not_null(),
            )
            .col(
                ColumnDef::new_with_type(PixelpinAuthUserAuth::UserId, self.user_id_type().clone())
                    .not_null(),
            )
            .col(ColumnDef::new(PixelpinAuthUserAuth::ExtraData).json().null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_pixelpin_auth_user_auth_user")
                    .from(PixelpinAuthUserAuth::Table, PixelpinAuthUserAuth::UserId)
                    .to(
                        Alias::new(&self.user_model.table),
                        Alias::new(&self.user_model.id_column),
                    )
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned()
    }

    pub fn create_index_statements(&self) -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .name("idx_pixelpin_auth_user_auth_provider_uid")
                .table(PixelpinAuthUserAuth::Table)
                .col(PixelpinAuthUserAuth::Provider)
                .col(PixelpinAuthUserAuth::Uid)
                .unique()
                .if_not_exists()
                .to_owned(),
            Index::create()
                .name("idx_pixelpin_auth_user_auth_user_id")
                .table(PixelpinAuthUserAuth::Table)
                .col(PixelpinAuthUserAuth::UserId)
                .if_not_exists()
                .to_owned(),
        ]
    }

    /// Create the association table and its indexes if they are missing.
    pub async fn create_tables<C: ConnectionTrait>(&self, conn: &C) -> Result<(), DbErr> {
        let backend = conn.get_database_backend();
        conn.execute(backend.build(&self.create_table_statement()))
            .await?;
        for index in self.create_index_statements() {
            conn.execute(backend.build(&index)).await?;
        }
        info!(table = %self.table_name(), "User-auth association table ready");
        Ok(())
    }
}
