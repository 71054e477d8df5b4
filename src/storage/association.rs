//! Cached OpenID provider associations (shared secret per endpoint and handle).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::constants::{
    ASSOCIATION_HANDLE_LENGTH, ASSOCIATION_SECRET_LENGTH, ASSOCIATION_TYPE_LENGTH,
    NONCE_SERVER_URL_LENGTH,
};
use crate::db::entities::association;
use crate::error::PixelpinAuthError;

use super::check_length;

/// An association as negotiated with a provider, before it is persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenIdAssociation {
    pub handle: String,
    pub secret: Vec<u8>,
    /// Unix timestamp (seconds) the association was issued at.
    pub issued: i64,
    /// Lifetime in seconds.
    pub lifetime: i64,
    pub assoc_type: String,
}

impl TryFrom<&association::Model> for OpenIdAssociation {
    type Error = PixelpinAuthError;

    fn try_from(model: &association::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            handle: model.handle.clone(),
            secret: model.secret_bytes()?,
            issued: model.issued,
            lifetime: model.lifetime,
            assoc_type: model.assoc_type.clone(),
        })
    }
}

pub struct AssociationStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AssociationStore<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert or refresh the association for `(server_url, handle)`.
    pub async fn store(
        &self,
        server_url: &str,
        assoc: &OpenIdAssociation,
    ) -> Result<association::Model, PixelpinAuthError> {
        check_length("server_url", server_url, NONCE_SERVER_URL_LENGTH)?;
        check_length("handle", &assoc.handle, ASSOCIATION_HANDLE_LENGTH)?;
        check_length("assoc_type", &assoc.assoc_type, ASSOCIATION_TYPE_LENGTH)?;

        let secret = STANDARD.encode(&assoc.secret);
        check_length("secret", &secret, ASSOCIATION_SECRET_LENGTH)?;
        let existing = association::Entity::find()
            .filter(association::Column::ServerUrl.eq(server_url))
            .filter(association::Column::Handle.eq(assoc.handle.as_str()))
            .one(self.conn)
            .await?;

        let model = match existing {
            Some(existing) => {
                let mut active: association::ActiveModel = existing.into();
                active.secret = Set(secret);
                active.issued = Set(assoc.issued);
                active.lifetime = Set(assoc.lifetime);
                active.assoc_type = Set(assoc.assoc_type.clone());
                active.update(self.conn).await?
            }
            None => {
                association::ActiveModel {
                    server_url: Set(server_url.to_string()),
                    handle: Set(assoc.handle.clone()),
                    secret: Set(secret),
                    issued: Set(assoc.issued),
                    lifetime: Set(assoc.lifetime),
                    assoc_type: Set(assoc.assoc_type.clone()),
                    ..Default::default()
                }
                .insert(self.conn)
                .await?
            }
        };
        debug!(server_url = %server_url, handle = %assoc.handle, "Association stored");
        Ok(model)
    }

    /// Associations for an endpoint, newest first.
    pub async fn get(
        &self,
        server_url: &str,
        handle: Option<&str>,
    ) -> Result<Vec<association::Model>, PixelpinAuthError> {
        let mut query = association::Entity::find()
            .filter(association::Column::ServerUrl.eq(server_url))
            .order_by_desc(association::Column::Issued);
        if let Some(handle) = handle {
            query = query.filter(association::Column::Handle.eq(handle));
        }
        Ok(query.all(self.conn).await?)
    }

    /// The newest association still within its lifetime. Expired ones found along
    /// the way are removed.
    pub async fn get_valid(
        &self,
        server_url: &str,
        handle: Option<&str>,
    ) -> Result<Option<OpenIdAssociation>, PixelpinAuthError> {
        let now = Utc::now().timestamp();
        let (expired, valid): (Vec<_>, Vec<_>) = self
            .get(server_url, handle)
            .await?
            .into_iter()
            .partition(|assoc| assoc.is_expired(now));

        if !expired.is_empty() {
            self.remove(expired.iter().map(|assoc| assoc.id).collect())
                .await?;
        }
        valid.first().map(OpenIdAssociation::try_from).transpose()
    }

    pub async fn remove(&self, ids: Vec<i32>) -> Result<u64, PixelpinAuthError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = association::Entity::delete_many()
            .filter(association::Column::Id.is_in(ids))
            .exec(self.conn)
            .await?;
        debug!(
            rows_deleted = result.rows_affected,
            "Associations removed"
        );
        Ok(result.rows_affected)
    }

    pub async fn cleanup_expired(&self) -> Result<u64, PixelpinAuthError> {
        let now = Utc::now().timestamp();
        let result = association::Entity::delete_many()
            .filter(
                Expr::expr(
                    Expr::col(association::Column::Issued)
                        .add(Expr::col(association::Column::Lifetime)),
                )
                .lte(now),
            )
            .exec(self.conn)
            .await?;
        debug!(
            rows_deleted = result.rows_affected,
            "Expired associations cleaned up"
        );
        Ok(result.rows_affected)
    }
}
