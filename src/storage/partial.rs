//! Partial pipeline state, saved when a step pauses for user input and loaded
//! again when the flow resumes.

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;
use uuid::Uuid;

use crate::constants::PARTIAL_BACKEND_LENGTH;
use crate::db::entities::partial;
use crate::error::PixelpinAuthError;

use super::check_length;

/// Arguments the paused step will be called with on resumption.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialData {
    #[serde(default)]
    pub args: Vec<JsonValue>,
    #[serde(default)]
    pub kwargs: Map<String, JsonValue>,
}

impl PartialData {
    pub fn extend_kwargs(&mut self, values: Map<String, JsonValue>) {
        self.kwargs.extend(values);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PartialPipeline {
    pub token: String,
    pub backend: String,
    pub next_step: i32,
    pub data: PartialData,
}

impl TryFrom<partial::Model> for PartialPipeline {
    type Error = PixelpinAuthError;

    fn try_from(model: partial::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            token: model.token,
            backend: model.backend,
            next_step: model.next_step,
            data: serde_json::from_value(model.data)?,
        })
    }
}

pub struct PartialStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PartialStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Build a new partial with a fresh token. Nothing is written until [Self::store].
    pub fn prepare(&self, backend: &str, next_step: i32, data: PartialData) -> PartialPipeline {
        PartialPipeline {
            token: Uuid::new_v4().simple().to_string(),
            backend: backend.to_string(),
            next_step,
            data,
        }
    }

    /// Save a partial, replacing whatever was stored under the same token.
    pub async fn store(&self, pipeline: &PartialPipeline) -> Result<(), PixelpinAuthError> {
        check_length("backend", &pipeline.backend, PARTIAL_BACKEND_LENGTH)?;
        let data = serde_json::to_value(&pipeline.data)?;
        let now = Utc::now();

        match partial::Entity::find()
            .filter(partial::Column::Token.eq(pipeline.token.as_str()))
            .one(self.conn)
            .await?
        {
            Some(existing) => {
                let mut active: partial::ActiveModel = existing.into();
                active.backend = Set(pipeline.backend.clone());
                active.next_step = Set(pipeline.next_step);
                active.data = Set(data);
                active.timestamp = Set(now);
                active.update(self.conn).await?;
            }
            None => {
                partial::ActiveModel {
                    token: Set(pipeline.token.clone()),
                    backend: Set(pipeline.backend.clone()),
                    next_step: Set(pipeline.next_step),
                    data: Set(data),
                    timestamp: Set(now),
                    ..Default::default()
                }
                .insert(self.conn)
                .await?;
            }
        }
        debug!(token = %pipeline.token, backend = %pipeline.backend, "Partial pipeline stored");
        Ok(())
    }

    pub async fn load(&self, token: &str) -> Result<Option<PartialPipeline>, PixelpinAuthError> {
        partial::Entity::find()
            .filter(partial::Column::Token.eq(token))
            .one(self.conn)
            .await?
            .map(PartialPipeline::try_from)
            .transpose()
    }

    pub async fn destroy(&self, token: &str) -> Result<(), PixelpinAuthError> {
        let result = partial::Entity::delete_many()
            .filter(partial::Column::Token.eq(token))
            .exec(self.conn)
            .await?;
        debug!(
            token = %token,
            rows_deleted = result.rows_affected,
            "Partial pipeline destroyed"
        );
        Ok(())
    }

    /// Drop partials nobody resumed within `max_age`.
    pub async fn cleanup_stale(&self, max_age: Duration) -> Result<u64, PixelpinAuthError> {
        let cutoff = Utc::now() - max_age;
        let result = partial::Entity::delete_many()
            .filter(partial::Column::Timestamp.lt(cutoff))
            .exec(self.conn)
            .await?;
        debug!(
            rows_deleted = result.rows_affected,
            "Stale partial pipelines cleaned up"
        );
        Ok(result.rows_affected)
    }
}
