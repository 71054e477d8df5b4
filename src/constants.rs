use std::sync::LazyLock;

use chrono::Duration;

/// Prefix applied to every setting name, see [crate::config::setting_name].
pub const SETTING_PREFIX: &str = "PIXELPIN_AUTH";

pub const DEFAULT_UID_LENGTH: u32 = 255;
pub const PROVIDER_LENGTH: u32 = 32;
pub const NONCE_SERVER_URL_LENGTH: u32 = 255;
pub const NONCE_SALT_LENGTH: u32 = 40;
pub const ASSOCIATION_HANDLE_LENGTH: u32 = 255;
pub const ASSOCIATION_TYPE_LENGTH: u32 = 64;
/// Length of the base64-encoded secret column.
pub const ASSOCIATION_SECRET_LENGTH: u32 = 255;
pub const CODE_EMAIL_LENGTH: u32 = 200;
pub const CODE_LENGTH: u32 = 32;
pub const PARTIAL_TOKEN_LENGTH: u32 = 32;
pub const PARTIAL_BACKEND_LENGTH: u32 = 32;

/// Nonces with a timestamp further than this from "now" are refused, and are
/// safe to purge once they fall out of the window.
pub(crate) static NONCE_SKEW: LazyLock<Duration> = LazyLock::new(|| Duration::hours(5));
