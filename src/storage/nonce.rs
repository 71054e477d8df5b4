//! One-use numbers, recorded so a signed OpenID response can't be replayed.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::debug;

use crate::constants::{NONCE_SALT_LENGTH, NONCE_SERVER_URL_LENGTH, NONCE_SKEW};
use crate::db::entities::nonce;
use crate::error::PixelpinAuthError;

use super::check_length;

pub struct NonceStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> NonceStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Record a nonce. Returns `true` when it was fresh, `false` if it has been
    /// seen before or its timestamp is outside the allowed clock skew.
    pub async fn use_nonce(
        &self,
        server_url: &str,
        timestamp: i64,
        salt: &str,
    ) -> Result<bool, PixelpinAuthError> {
        let now = Utc::now().timestamp();
        if timestamp.abs_diff(now) > NONCE_SKEW.num_seconds().unsigned_abs() {
            debug!(server_url = %server_url, timestamp, "Nonce timestamp outside skew window");
            return Ok(false);
        }
        if self.get(server_url, timestamp, salt).await?.is_some() {
            debug!(server_url = %server_url, timestamp, "Nonce replayed");
            return Ok(false);
        }
        check_length("server_url", server_url, NONCE_SERVER_URL_LENGTH)?;
        check_length("salt", salt, NONCE_SALT_LENGTH)?;

        let entry = nonce::ActiveModel {
            server_url: Set(server_url.to_string()),
            timestamp: Set(timestamp),
            salt: Set(salt.to_string()),
            ..Default::default()
        };
        match entry.insert(self.conn).await.map_err(PixelpinAuthError::from) {
            Ok(_) => {
                debug!(server_url = %server_url, timestamp, "Nonce recorded");
                Ok(true)
            }
            // Lost a race with a concurrent use of the same nonce
            Err(PixelpinAuthError::UniqueViolation(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub async fn get(
        &self,
        server_url: &str,
        timestamp: i64,
        salt: &str,
    ) -> Result<Option<nonce::Model>, PixelpinAuthError> {
        Ok(nonce::Entity::find()
            .filter(nonce::Column::ServerUrl.eq(server_url))
            .filter(nonce::Column::Timestamp.eq(timestamp))
            .filter(nonce::Column::Salt.eq(salt))
            .one(self.conn)
            .await?)
    }

    pub async fn delete(&self, id: i32) -> Result<(), PixelpinAuthError> {
        let result = nonce::Entity::delete_by_id(id).exec(self.conn).await?;
        debug!(id, rows_deleted = result.rows_affected, "Nonce deleted");
        Ok(())
    }

    /// Remove nonces old enough that [Self::use_nonce] would refuse them anyway.
    pub async fn cleanup_expired(&self) -> Result<u64, PixelpinAuthError> {
        let cutoff = Utc::now().timestamp() - NONCE_SKEW.num_seconds();
        let result = nonce::Entity::delete_many()
            .filter(nonce::Column::Timestamp.lt(cutoff))
            .exec(self.conn)
            .await?;
        debug!(
            rows_deleted = result.rows_affected,
            "Expired nonces cleaned up"
        );
        Ok(result.rows_affected)
    }
}
