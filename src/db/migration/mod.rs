//! Database migrations using SeaORM migration framework
//!
//! Covers the four tables with a fixed shape. The user-auth association table
//! depends on host configuration and is created from [crate::schema::Schema].

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_nonce::Migration),
            Box::new(m20250301_000002_create_association::Migration),
            Box::new(m20250301_000003_create_code::Migration),
            Box::new(m20250301_000004_create_partial::Migration),
        ]
    }
}

pub mod m20250301_000001_create_nonce;
pub mod m20250301_000002_create_association;
pub mod m20250301_000003_create_code;
pub mod m20250301_000004_create_partial;
