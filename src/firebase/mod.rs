//! Firebase app bootstrap.
//!
//! DESIGN
//! ======
//! `FirebaseApp::initialize` is the one place the Firebase config is turned
//! into live handles: a shared HTTP client, the auth provider (with local
//! persistence, so a restart restores the signed-in user) and a Firestore
//! handle. Data access through Firestore lives outside this crate; only the
//! handle is provided here.

pub mod auth;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::auth::AuthError;
use crate::config::FirebaseConfig;
use crate::storage::KeyValueStore;

pub use auth::FirebaseAuth;

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub struct FirebaseApp {
    config: FirebaseConfig,
    auth: Arc<FirebaseAuth>,
    firestore: Firestore,
}

impl FirebaseApp {
    /// Build the HTTP client and service handles, then restore any persisted
    /// user so the auth state resolves.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if the HTTP client cannot be built.
    pub fn initialize(config: FirebaseConfig, persistence: Arc<dyn KeyValueStore>) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthError::Provider(format!("http client build failed: {e}")))?;

        let auth = Arc::new(FirebaseAuth::new(&config, http, persistence));
        auth.restore_persisted_user();

        let firestore = Firestore::new(&config.project_id);
        info!(project_id = %config.project_id, auth_domain = %config.auth_domain, "firebase initialized");

        Ok(Self { config, auth, firestore })
    }

    #[must_use]
    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    #[must_use]
    pub fn auth(&self) -> Arc<FirebaseAuth> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }
}

/// Handle to the project's default Firestore database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firestore {
    project_id: String,
}

impl Firestore {
    #[must_use]
    pub fn new(project_id: &str) -> Self {
        Self { project_id: project_id.to_owned() }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// REST base URL for documents in the default database.
    #[must_use]
    pub fn documents_url(&self) -> String {
        format!("{FIRESTORE_BASE_URL}/projects/{}/databases/(default)/documents", self.project_id)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
