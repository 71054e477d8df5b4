//! Database layer for the social auth storage tables
//!
//! Uses SeaORM for schema management and migrations. SQLite and PostgreSQL are
//! supported; SQLite connections get their PRAGMAs configured on connect.

pub mod entities;
pub mod migration;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use sea_orm_migration::prelude::*;
use std::path::Path;
use tokio::fs::create_dir_all;
use tracing::{debug, info};

use migration::Migrator;

/// Build a SQLite connection string for a database file, creating its directory.
pub async fn sqlite_url(db_path: &Path) -> Result<String, DbErr> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            create_dir_all(parent)
                .await
                .map_err(|e| DbErr::Custom(format!("Failed to create database dir: {}", e)))?;
        }
    }
    Ok(format!("sqlite://{}?mode=rwc", db_path.display()))
}

/// Initialize database connection and run migrations
pub async fn initialize_database(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    debug!("Connecting to database");

    let db = Database::connect(database_url).await?;

    if db.get_database_backend() == DbBackend::Sqlite {
        configure_sqlite_pragmas(&db).await?;
    }

    run_migrations(&db).await?;

    Ok(db)
}

/// Apply the migrations for the nonce, association, code and partial tables
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    info!("Running database migrations...");
    Migrator::up(db, None).await?;
    info!("Database migrations complete");
    Ok(())
}

/// Configure SQLite PRAGMA settings
async fn configure_sqlite_pragmas(db: &DatabaseConnection) -> Result<(), DbErr> {
    // SQLite only honours REFERENCES clauses when asked to
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;

    // Enable WAL mode for better concurrency
    db.execute_unprepared("PRAGMA journal_mode = WAL").await?;

    // Use memory for temporary storage
    db.execute_unprepared("PRAGMA temp_store = MEMORY").await?;

    debug!("SQLite PRAGMA configuration complete");
    Ok(())
}

/// Initialize in-memory database for testing
#[cfg(test)]
pub async fn initialize_in_memory_database() -> Result<DatabaseConnection, DbErr> {
    initialize_database("sqlite::memory:").await
}
