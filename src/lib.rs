//! SeaORM storage backend for the pixelpin social authentication pipeline.
//!
//! The host application registers its user entity, then calls
//! [init_pixelpin_auth] once with its settings to get a [PixelpinStorage]:
//!
//! ```no_run
//! # use pixelpin_auth_seaorm::{ModelRegistry, Settings, init_pixelpin_auth};
//! # async fn example(db: sea_orm::DatabaseConnection) -> Result<(), pixelpin_auth_seaorm::PixelpinAuthError> {
//! let mut settings = Settings::from_env();
//! settings.set("USER_MODEL", "app.models.User");
//! let registry = ModelRegistry::new();
//! // registry.register::<app::models::user::Entity>("app.models.User");
//! let storage = init_pixelpin_auth(&settings, &registry)?;
//! storage.migrate(&db).await?;
//! let existing = storage.user(&db).get_social_auth("pixelpin", "12345").await?;
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub(crate) mod logging;
pub mod schema;
pub mod setup;
pub mod storage;
pub mod user_model;

#[cfg(test)]
mod tests;

pub use config::{Settings, StorageConfig, setting_name};
pub use error::PixelpinAuthError;
pub use schema::{Schema, SchemaBuilder, UserId};
pub use setup::init_pixelpin_auth;
pub use storage::PixelpinStorage;
pub use user_model::{HostUser, ModelRegistry, UserModelDescriptor};
