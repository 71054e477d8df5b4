//! Single use codes, eg. for validating an email address mid-pipeline.

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::debug;
use uuid::Uuid;

use crate::constants::CODE_EMAIL_LENGTH;
use crate::db::entities::code;
use crate::error::PixelpinAuthError;

use super::check_length;

pub struct CodeStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CodeStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn make_code(&self, email: &str) -> Result<code::Model, PixelpinAuthError> {
        check_length("email", email, CODE_EMAIL_LENGTH)?;
        let entry = code::ActiveModel {
            email: Set(email.to_string()),
            code: Set(Uuid::new_v4().simple().to_string()),
            verified: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;
        debug!(email = %email, "Verification code created");
        Ok(entry)
    }

    pub async fn get_code(&self, code: &str) -> Result<Option<code::Model>, PixelpinAuthError> {
        Ok(code::Entity::find()
            .filter(code::Column::Code.eq(code))
            .one(self.conn)
            .await?)
    }

    /// Mark a code as verified. Returns `false` if the code is unknown or was
    /// already verified.
    pub async fn verify(&self, code: &str) -> Result<bool, PixelpinAuthError> {
        let Some(entry) = self.get_code(code).await? else {
            return Ok(false);
        };
        if entry.verified {
            debug!(email = %entry.email, "Code already verified");
            return Ok(false);
        }
        let mut active: code::ActiveModel = entry.into();
        active.verified = Set(true);
        let entry = active.update(self.conn).await?;
        debug!(email = %entry.email, "Code verified");
        Ok(true)
    }

    /// Remove codes older than `max_age`, verified or not.
    pub async fn cleanup_stale(&self, max_age: Duration) -> Result<u64, PixelpinAuthError> {
        let cutoff = Utc::now() - max_age;
        let result = code::Entity::delete_many()
            .filter(code::Column::CreatedAt.lt(cutoff))
            .exec(self.conn)
            .await?;
        debug!(
            rows_deleted = result.rows_affected,
            "Stale verification codes cleaned up"
        );
        Ok(result.rows_affected)
    }
}
