//! Google Maps script loader.
//!
//! The Maps JavaScript API is fetched at most once per loader. Concurrent
//! callers queue behind one in-flight fetch. A failed fetch is returned only
//! to the caller that ran it and is not remembered; the next queued or later
//! caller runs its own fetch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

pub const MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";
pub const DEFAULT_LIBRARIES: &[&str] = &["places"];

const SCRIPT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MapsError {
    #[error("google api key is empty")]
    MissingApiKey,
    #[error("maps script request failed: {0}")]
    Request(String),
    #[error("maps script returned status {0}")]
    Status(u16),
}

/// Handle to a loaded Maps API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsApi {
    pub script_url: String,
    pub libraries: Vec<String>,
    pub script_bytes: usize,
}

/// Fetches a script by URL and reports its size.
#[async_trait::async_trait]
pub trait ScriptLoader: Send + Sync {
    async fn load_script(&self, url: &str) -> Result<usize, MapsError>;
}

/// `ScriptLoader` over HTTP.
pub struct HttpScriptLoader {
    http: reqwest::Client,
}

impl HttpScriptLoader {
    /// # Errors
    ///
    /// Returns [`MapsError::Request`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, MapsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(SCRIPT_TIMEOUT_SECS))
            .build()
            .map_err(|e| MapsError::Request(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl ScriptLoader for HttpScriptLoader {
    async fn load_script(&self, url: &str) -> Result<usize, MapsError> {
        let response = self.http.get(url).send().await.map_err(|e| MapsError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapsError::Status(status.as_u16()));
        }
        let body = response.bytes().await.map_err(|e| MapsError::Request(e.to_string()))?;
        Ok(body.len())
    }
}

pub struct MapsLoader {
    api_key: String,
    libraries: Vec<String>,
    loader: Arc<dyn ScriptLoader>,
    loaded: OnceCell<MapsApi>,
}

impl MapsLoader {
    #[must_use]
    pub fn new(api_key: impl Into<String>, loader: Arc<dyn ScriptLoader>) -> Self {
        Self {
            api_key: api_key.into(),
            libraries: DEFAULT_LIBRARIES.iter().map(|lib| (*lib).to_owned()).collect(),
            loader,
            loaded: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_libraries(mut self, libraries: &[&str]) -> Self {
        self.libraries = libraries.iter().map(|lib| (*lib).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn script_url(&self) -> String {
        let mut url = format!("{MAPS_SCRIPT_URL}?key={}", urlencoding::encode(&self.api_key));
        if !self.libraries.is_empty() {
            url.push_str("&libraries=");
            url.push_str(&self.libraries.join(","));
        }
        url
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Load the Maps API, or return the handle from an earlier load.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::MissingApiKey`] for an empty key, or the loader's
    /// error if the fetch fails.
    pub async fn load(&self) -> Result<&MapsApi, MapsError> {
        self.loaded
            .get_or_try_init(|| async {
                if self.api_key.is_empty() {
                    return Err(MapsError::MissingApiKey);
                }
                let script_url = self.script_url();
                let script_bytes = self.loader.load_script(&script_url).await.inspect_err(|e| {
                    warn!(error = %e, "maps script load failed");
                })?;
                info!(libraries = ?self.libraries, script_bytes, "maps api loaded");
                Ok(MapsApi { script_url, libraries: self.libraries.clone(), script_bytes })
            })
            .await
    }
}

#[cfg(test)]
#[path = "maps_test.rs"]
mod tests;
