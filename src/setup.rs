//! One-shot initialisation of the storage backend.

use tracing::info;

use crate::config::{Settings, StorageConfig};
use crate::error::PixelpinAuthError;
use crate::schema::SchemaBuilder;
use crate::storage::PixelpinStorage;
use crate::user_model::ModelRegistry;

/// Build the storage backend from host settings.
///
/// Reads `UID_LENGTH` (default 255) and `USER_MODEL`, resolves the user model
/// through `registry`, and returns storage whose user-auth table carries a
/// `(provider, uid)` uniqueness constraint, a `uid` column of the configured
/// length, and a `user_id` foreign key typed like the host id column.
///
/// Fails with [PixelpinAuthError::UserModelNotResolvable] when the named model
/// has not been registered.
pub fn init_pixelpin_auth(
    settings: &Settings,
    registry: &ModelRegistry,
) -> Result<PixelpinStorage, PixelpinAuthError> {
    let config = StorageConfig::from_settings(settings)?;
    let user_model = registry.resolve(&config.user_model)?.clone();
    let schema = SchemaBuilder::new(&config).user_model(user_model).build()?;
    info!(
        uid_length = schema.uid_length(),
        user_model = %config.user_model,
        user_table = %schema.user_model().table,
        "Pixelpin auth storage initialised"
    );
    Ok(PixelpinStorage::new(schema))
}
