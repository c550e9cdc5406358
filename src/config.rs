//! App configuration parsed from environment variables.
//!
//! Firebase is all-or-nothing: when none of the `FIREBASE_*` variables are
//! set the app runs on the in-memory auth provider; a partial set is a
//! configuration error rather than a silent fallback.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FIREBASE_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_AUTH_RESOLUTION_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOGOUT_GRACE_MS: u64 = 100;
pub const DEFAULT_DATA_DIR: &str = ".unify";

const FIREBASE_VARS: [&str; 6] = [
    "FIREBASE_API_KEY",
    "FIREBASE_AUTH_DOMAIN",
    "FIREBASE_PROJECT_ID",
    "FIREBASE_STORAGE_BUCKET",
    "FIREBASE_MESSAGING_SENDER_ID",
    "FIREBASE_APP_ID",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    /// Identity Toolkit endpoint, without trailing slash.
    pub auth_base_url: String,
}

impl FirebaseConfig {
    /// Build Firebase config from environment variables.
    ///
    /// Returns `Ok(None)` when no `FIREBASE_*` variable is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent variable when
    /// only some of them are set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let values: Vec<Option<String>> = FIREBASE_VARS.iter().map(|var| env_non_empty(var)).collect();
        if values.iter().all(Option::is_none) {
            return Ok(None);
        }

        let require = |index: usize| {
            values[index]
                .clone()
                .ok_or_else(|| ConfigError::Missing { var: FIREBASE_VARS[index].to_owned() })
        };
        let api_key = require(0)?;
        let auth_domain = require(1)?;
        let project_id = require(2)?;
        let storage_bucket = require(3)?;
        let messaging_sender_id = require(4)?;
        let app_id = require(5)?;

        let auth_base_url = std::env::var("FIREBASE_AUTH_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_FIREBASE_AUTH_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Some(Self { api_key, auth_domain, project_id, storage_bucket, messaging_sender_id, app_id, auth_base_url }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` runs the app on the in-memory auth provider.
    pub firebase: Option<FirebaseConfig>,
    /// `None` disables the maps loader.
    pub google_api_key: Option<String>,
    pub auth_resolution_timeout: Duration,
    pub logout_grace_period: Duration,
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Build typed app config from environment variables.
    ///
    /// Optional:
    /// - `GOOGLE_API_KEY`: enables the maps loader
    /// - `AUTH_RESOLUTION_TIMEOUT_MS`: default 10000
    /// - `LOGOUT_GRACE_MS`: default 100
    /// - `UNIFY_DATA_DIR`: default `.unify`
    ///
    /// # Errors
    ///
    /// Returns an error if the Firebase variables are only partially set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            firebase: FirebaseConfig::from_env()?,
            google_api_key: env_non_empty("GOOGLE_API_KEY"),
            auth_resolution_timeout: Duration::from_millis(env_parse_u64(
                "AUTH_RESOLUTION_TIMEOUT_MS",
                DEFAULT_AUTH_RESOLUTION_TIMEOUT_MS,
            )),
            logout_grace_period: Duration::from_millis(env_parse_u64("LOGOUT_GRACE_MS", DEFAULT_LOGOUT_GRACE_MS)),
            data_dir: env_non_empty("UNIFY_DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            firebase: None,
            google_api_key: None,
            auth_resolution_timeout: Duration::from_millis(DEFAULT_AUTH_RESOLUTION_TIMEOUT_MS),
            logout_grace_period: Duration::from_millis(DEFAULT_LOGOUT_GRACE_MS),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
