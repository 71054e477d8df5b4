use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sea_orm::DbErr;
use sea_orm::sea_query::{ColumnType, StringLen};

use crate::db::sqlite_url;
use crate::user_model::UserModelDescriptor;

#[derive(Parser, Debug)]
#[clap(about = "Manage the pixelpin auth storage tables")]
pub struct Cli {
    #[clap(
        long,
        env = "PIXELPIN_AUTH_DATABASE_URL",
        conflicts_with = "database_path",
        required_unless_present = "database_path"
    )]
    pub database_url: Option<String>,

    /// SQLite database file, created with its parent directory if missing
    #[clap(long, env = "PIXELPIN_AUTH_DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Connection string from `--database-url`, or built from `--database-path`.
    pub async fn resolve_database_url(&self) -> Result<String, DbErr> {
        match (&self.database_url, &self.database_path) {
            (Some(url), _) => Ok(url.clone()),
            (None, Some(path)) => sqlite_url(path).await,
            (None, None) => Err(DbErr::Custom(
                "either --database-url or --database-path is required".to_string(),
            )),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the storage tables next to an existing host user table
    Migrate(MigrateArgs),
    /// Purge expired nonces, associations, codes and partials
    Cleanup(CleanupArgs),
}

#[derive(clap::Args, Debug)]
pub struct MigrateArgs {
    #[clap(long, default_value = "255", env = "PIXELPIN_AUTH_UID_LENGTH")]
    pub uid_length: u32,

    #[clap(long, default_value = "users", env = "PIXELPIN_AUTH_USER_TABLE")]
    pub user_table: String,

    #[clap(long, default_value = "id")]
    pub user_id_column: String,

    #[clap(long, value_enum, default_value = "integer")]
    pub user_id_type: UserIdType,

    #[clap(long, default_value = "username")]
    pub username_column: String,

    /// Length of the host username column, omit when unbounded
    #[clap(long)]
    pub username_length: Option<u32>,

    #[clap(long)]
    pub email_column: Option<String>,
}

impl MigrateArgs {
    pub fn user_model(&self) -> UserModelDescriptor {
        UserModelDescriptor {
            table: self.user_table.clone(),
            id_column: self.user_id_column.clone(),
            id_type: self.user_id_type.column_type(),
            username_column: self.username_column.clone(),
            username_type: ColumnType::String(match self.username_length {
                Some(length) => StringLen::N(length),
                None => StringLen::None,
            }),
            email_column: self.email_column.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct CleanupArgs {
    /// Repeat every N seconds instead of running once
    #[clap(long, env = "PIXELPIN_AUTH_CLEANUP_INTERVAL")]
    pub interval: Option<u64>,

    #[clap(long, default_value = "24")]
    pub code_max_age_hours: i64,

    #[clap(long, default_value = "24")]
    pub partial_max_age_hours: i64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserIdType {
    SmallInteger,
    Integer,
    BigInteger,
    Text,
    Uuid,
}

impl UserIdType {
    pub fn column_type(self) -> ColumnType {
        match self {
            UserIdType::SmallInteger => ColumnType::SmallInteger,
            UserIdType::Integer => ColumnType::Integer,
            UserIdType::BigInteger => ColumnType::BigInteger,
            UserIdType::Text => ColumnType::String(StringLen::None),
            UserIdType::Uuid => ColumnType::Uuid,
        }
    }
}
