//! Settings lookup and the typed storage configuration derived from it.
//!
//! Settings are flat string key/value pairs named with [setting_name], so a host
//! application can feed them from its own configuration or from the environment.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::constants::{DEFAULT_UID_LENGTH, SETTING_PREFIX};
use crate::error::PixelpinAuthError;

/// Build the prefixed, upper-cased key for a setting, eg `["UID_LENGTH"]` becomes
/// `PIXELPIN_AUTH_UID_LENGTH`.
pub fn setting_name(names: &[&str]) -> String {
    let mut parts = vec![SETTING_PREFIX];
    parts.extend(names.iter().copied().filter(|name| !name.is_empty()));
    parts.join("_").to_uppercase().replace('-', "_")
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Settings(HashMap<String, String>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every environment variable carrying the settings prefix.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let prefix = format!("{SETTING_PREFIX}_");
        Self(
            vars.into_iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .collect(),
        )
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Shorthand for `insert(setting_name(&[name]), value)`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.insert(setting_name(&[name]), value)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&setting_name(&[name])).map(String::as_str)
    }

    pub fn require(&self, name: &str) -> Result<&str, PixelpinAuthError> {
        self.get(name)
            .ok_or_else(|| PixelpinAuthError::MissingSetting(setting_name(&[name])))
    }

    pub fn get_parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, PixelpinAuthError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| PixelpinAuthError::InvalidSetting {
                    name: setting_name(&[name]),
                    value: value.to_string(),
                }),
        }
    }
}

/// Configuration consumed by the schema builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub uid_length: u32,
    pub user_model: String,
}

impl StorageConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, PixelpinAuthError> {
        let uid_length = settings
            .get_parsed::<u32>("UID_LENGTH")?
            .unwrap_or(DEFAULT_UID_LENGTH);
        if uid_length == 0 {
            return Err(PixelpinAuthError::InvalidSetting {
                name: setting_name(&["UID_LENGTH"]),
                value: uid_length.to_string(),
            });
        }
        let user_model = settings.require("USER_MODEL")?.to_string();
        debug!(uid_length, user_model = %user_model, "Loaded storage configuration");
        Ok(Self {
            uid_length,
            user_model,
        })
    }
}
