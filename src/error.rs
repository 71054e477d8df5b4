//! Centralized error types for the pixelpin auth storage backend.

use std::error::Error;

use sea_orm::{DbErr, SqlErr};

#[derive(Debug)]
pub enum PixelpinAuthError {
    Base64(base64::DecodeError),
    Configuration(String),
    Database(String),
    FieldTooLong {
        field: &'static str,
        length: usize,
        max: u32,
    },
    InvalidSetting {
        name: String,
        value: String,
    },
    InvalidUserId(String),
    MissingSetting(String),
    NotFound(String),
    SerdeJson(serde_json::Error),
    UniqueViolation(String),
    UnsupportedUserIdType(String),
    UserModelNotResolvable(String),
}

impl std::fmt::Display for PixelpinAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelpinAuthError::Base64(e) => write!(f, "Base64 Decode Error: {}", e),
            PixelpinAuthError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
            PixelpinAuthError::Database(msg) => write!(f, "Database Error: {}", msg),
            PixelpinAuthError::FieldTooLong { field, length, max } => {
                write!(
                    f,
                    "Value for '{field}' is too long: {length} characters, maximum {max}"
                )
            }
            PixelpinAuthError::InvalidSetting { name, value } => {
                write!(f, "Invalid value for setting {name}: '{value}'")
            }
            PixelpinAuthError::InvalidUserId(msg) => write!(f, "Invalid user id: {}", msg),
            PixelpinAuthError::MissingSetting(name) => {
                write!(f, "Required setting {name} is not configured")
            }
            PixelpinAuthError::NotFound(msg) => write!(f, "Not found: {}", msg),
            PixelpinAuthError::SerdeJson(e) => write!(f, "Serde-JSON Error: {}", e),
            PixelpinAuthError::UniqueViolation(msg) => {
                write!(f, "Unique constraint violated: {}", msg)
            }
            PixelpinAuthError::UnsupportedUserIdType(column_type) => {
                write!(
                    f,
                    "User model id column type {column_type} cannot be used as a foreign key"
                )
            }
            PixelpinAuthError::UserModelNotResolvable(name) => {
                write!(
                    f,
                    "User model '{name}' could not be resolved, register it before initialising storage"
                )
            }
        }
    }
}

impl Error for PixelpinAuthError {}

impl From<DbErr> for PixelpinAuthError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => PixelpinAuthError::UniqueViolation(msg),
            _ => PixelpinAuthError::Database(err.to_string()),
        }
    }
}

impl From<sea_orm::sea_query::error::Error> for PixelpinAuthError {
    fn from(err: sea_orm::sea_query::error::Error) -> Self {
        PixelpinAuthError::Database(format!("Failed to build query: {}", err))
    }
}

impl From<serde_json::Error> for PixelpinAuthError {
    fn from(err: serde_json::Error) -> Self {
        PixelpinAuthError::SerdeJson(err)
    }
}

impl From<base64::DecodeError> for PixelpinAuthError {
    fn from(err: base64::DecodeError) -> Self {
        PixelpinAuthError::Base64(err)
    }
}
