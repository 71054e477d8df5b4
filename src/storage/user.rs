//! Links between host users and third-party provider accounts.

use sea_orm::sea_query::{Alias, Expr, Func, Order, Query, SelectStatement};
use sea_orm::{ConnectionTrait, EntityTrait, QueryFilter, QueryResult, Value};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::constants::PROVIDER_LENGTH;
use crate::error::PixelpinAuthError;
use crate::schema::{PixelpinAuthUserAuth, Schema, UserId};
use crate::user_model::UserModelDescriptor;

use super::check_length;

#[derive(Clone, Debug, PartialEq)]
pub struct UserSocialAuth {
    pub id: i32,
    pub provider: String,
    pub uid: String,
    pub user_id: UserId,
    pub extra_data: Option<JsonValue>,
}

pub struct UserStore<'a, C: ConnectionTrait> {
    conn: &'a C,
    schema: &'a Schema,
}

impl<'a, C: ConnectionTrait> UserStore<'a, C> {
    pub(crate) fn new(conn: &'a C, schema: &'a Schema) -> Self {
        Self { conn, schema }
    }

    /// The host user model the associations point at.
    pub fn user_model(&self) -> &UserModelDescriptor {
        self.schema.user_model()
    }

    pub fn username_max_length(&self) -> Option<u32> {
        self.schema.username_max_length()
    }

    fn select(&self) -> SelectStatement {
        Query::select()
            .columns([
                PixelpinAuthUserAuth::Id,
                PixelpinAuthUserAuth::Provider,
                PixelpinAuthUserAuth::Uid,
                PixelpinAuthUserAuth::UserId,
                PixelpinAuthUserAuth::ExtraData,
            ])
            .from(PixelpinAuthUserAuth::Table)
            .to_owned()
    }

    fn from_row(&self, row: &QueryResult) -> Result<UserSocialAuth, PixelpinAuthError> {
        Ok(UserSocialAuth {
            id: row.try_get("", "id")?,
            provider: row.try_get("", "provider")?,
            uid: row.try_get("", "uid")?,
            user_id: self.schema.user_id_kind().decode(row, "user_id")?,
            extra_data: row.try_get("", "extra_data")?,
        })
    }

    async fn fetch_one(
        &self,
        query: &SelectStatement,
    ) -> Result<Option<UserSocialAuth>, PixelpinAuthError> {
        let backend = self.conn.get_database_backend();
        match self.conn.query_one(backend.build(query)).await? {
            Some(row) => Ok(Some(self.from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_all(
        &self,
        query: &SelectStatement,
    ) -> Result<Vec<UserSocialAuth>, PixelpinAuthError> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_all(backend.build(query))
            .await?
            .iter()
            .map(|row| self.from_row(row))
            .collect()
    }

    fn user_id_value(&self, user_id: &UserId) -> Result<Value, PixelpinAuthError> {
        self.schema.user_id_kind().to_value(user_id)
    }

    pub async fn get_social_auth(
        &self,
        provider: &str,
        uid: &str,
    ) -> Result<Option<UserSocialAuth>, PixelpinAuthError> {
        let query = self
            .select()
            .and_where(Expr::col(PixelpinAuthUserAuth::Provider).eq(provider))
            .and_where(Expr::col(PixelpinAuthUserAuth::Uid).eq(uid))
            .to_owned();
        self.fetch_one(&query).await
    }

    pub async fn get_social_auth_by_id(
        &self,
        id: i32,
    ) -> Result<Option<UserSocialAuth>, PixelpinAuthError> {
        let query = self
            .select()
            .and_where(Expr::col(PixelpinAuthUserAuth::Id).eq(id))
            .to_owned();
        self.fetch_one(&query).await
    }

    /// Associations of one host user, optionally narrowed to a provider or an id.
    pub async fn get_social_auth_for_user(
        &self,
        user_id: &UserId,
        provider: Option<&str>,
        id: Option<i32>,
    ) -> Result<Vec<UserSocialAuth>, PixelpinAuthError> {
        let mut query = self
            .select()
            .and_where(Expr::col(PixelpinAuthUserAuth::UserId).eq(self.user_id_value(user_id)?))
            .order_by(PixelpinAuthUserAuth::Id, Order::Asc)
            .to_owned();
        if let Some(provider) = provider {
            query.and_where(Expr::col(PixelpinAuthUserAuth::Provider).eq(provider));
        }
        if let Some(id) = id {
            query.and_where(Expr::col(PixelpinAuthUserAuth::Id).eq(id));
        }
        self.fetch_all(&query).await
    }

    pub async fn create_social_auth(
        &self,
        user_id: &UserId,
        uid: &str,
        provider: &str,
    ) -> Result<UserSocialAuth, PixelpinAuthError> {
        check_length("provider", provider, PROVIDER_LENGTH)?;
        check_length("uid", uid, self.schema.uid_length())?;

        let insert = Query::insert()
            .into_table(PixelpinAuthUserAuth::Table)
            .columns([
                PixelpinAuthUserAuth::Provider,
                PixelpinAuthUserAuth::Uid,
                PixelpinAuthUserAuth::UserId,
            ])
            .values([
                provider.into(),
                uid.into(),
                self.user_id_value(user_id)?.into(),
            ])?
            .to_owned();
        let backend = self.conn.get_database_backend();
        self.conn.execute(backend.build(&insert)).await?;

        debug!(provider = %provider, uid = %uid, user_id = %user_id, "Social auth created");
        self.get_social_auth(provider, uid).await?.ok_or_else(|| {
            PixelpinAuthError::NotFound(format!("social auth {provider}/{uid} after insert"))
        })
    }

    /// Merge provider data into the stored extra data, returns whether it changed.
    pub async fn set_extra_data(
        &self,
        id: i32,
        extra_data: JsonValue,
    ) -> Result<bool, PixelpinAuthError> {
        let current = self
            .get_social_auth_by_id(id)
            .await?
            .ok_or_else(|| PixelpinAuthError::NotFound(format!("social auth {id}")))?;

        let merged = match (current.extra_data.clone(), extra_data) {
            (Some(JsonValue::Object(mut existing)), JsonValue::Object(update)) => {
                existing.extend(update);
                JsonValue::Object(existing)
            }
            (_, update) => update,
        };
        if current.extra_data.as_ref() == Some(&merged) {
            return Ok(false);
        }

        let update = Query::update()
            .table(PixelpinAuthUserAuth::Table)
            .value(PixelpinAuthUserAuth::ExtraData, merged)
            .and_where(Expr::col(PixelpinAuthUserAuth::Id).eq(id))
            .to_owned();
        let backend = self.conn.get_database_backend();
        self.conn.execute(backend.build(&update)).await?;
        debug!(id, "Social auth extra data updated");
        Ok(true)
    }

    /// Whether removing an association would still leave the user a way to log in.
    pub async fn allowed_to_disconnect(
        &self,
        user_id: &UserId,
        provider: &str,
        association_id: Option<i32>,
        has_usable_password: bool,
    ) -> Result<bool, PixelpinAuthError> {
        if has_usable_password {
            return Ok(true);
        }
        let mut query = Query::select()
            .expr(Expr::col(PixelpinAuthUserAuth::Id).count())
            .from(PixelpinAuthUserAuth::Table)
            .and_where(Expr::col(PixelpinAuthUserAuth::UserId).eq(self.user_id_value(user_id)?))
            .to_owned();
        match association_id {
            Some(id) => query.and_where(Expr::col(PixelpinAuthUserAuth::Id).ne(id)),
            None => query.and_where(Expr::col(PixelpinAuthUserAuth::Provider).ne(provider)),
        };
        let backend = self.conn.get_database_backend();
        let remaining = match self.conn.query_one(backend.build(&query)).await? {
            Some(row) => row.try_get_by_index::<i64>(0)?,
            None => 0,
        };
        Ok(remaining > 0)
    }

    pub async fn disconnect(&self, id: i32) -> Result<(), PixelpinAuthError> {
        let delete = Query::delete()
            .from_table(PixelpinAuthUserAuth::Table)
            .and_where(Expr::col(PixelpinAuthUserAuth::Id).eq(id))
            .to_owned();
        let backend = self.conn.get_database_backend();
        let result = self.conn.execute(backend.build(&delete)).await?;
        debug!(
            id,
            rows_deleted = result.rows_affected(),
            "Social auth disconnected"
        );
        Ok(())
    }

    /// Load the host user an association belongs to.
    pub async fn get_user<U: EntityTrait>(
        &self,
        user_id: &UserId,
    ) -> Result<Option<U::Model>, PixelpinAuthError> {
        let model = self.schema.user_model();
        let table = U::default().table_name().to_string();
        if table != model.table {
            return Err(PixelpinAuthError::Configuration(format!(
                "entity table {table} is not the configured user model table {}",
                model.table
            )));
        }
        let user = U::find()
            .filter(
                Expr::col((Alias::new(&model.table), Alias::new(&model.id_column)))
                    .eq(self.user_id_value(user_id)?),
            )
            .one(self.conn)
            .await?;
        Ok(user)
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool, PixelpinAuthError> {
        let model = self.schema.user_model();
        let query = Query::select()
            .column(Alias::new(&model.id_column))
            .from(Alias::new(&model.table))
            .and_where(Expr::col(Alias::new(&model.username_column)).eq(username))
            .limit(1)
            .to_owned();
        let backend = self.conn.get_database_backend();
        Ok(self.conn.query_one(backend.build(&query)).await?.is_some())
    }

    /// Host users with a matching email, compared case-insensitively. Empty when
    /// the user model has no email column.
    pub async fn get_users_by_email(&self, email: &str) -> Result<Vec<UserId>, PixelpinAuthError> {
        let model = self.schema.user_model();
        let Some(email_column) = model.email_column.as_ref() else {
            return Ok(Vec::new());
        };
        let query = Query::select()
            .column(Alias::new(&model.id_column))
            .from(Alias::new(&model.table))
            .and_where(
                Expr::expr(Func::lower(Expr::col(Alias::new(email_column))))
                    .eq(email.to_lowercase()),
            )
            .to_owned();
        let backend = self.conn.get_database_backend();
        self.conn
            .query_all(backend.build(&query))
            .await?
            .iter()
            .map(|row| {
                self.schema
                    .user_id_kind()
                    .decode(row, &model.id_column)
                    .map_err(PixelpinAuthError::from)
            })
            .collect()
    }
}
