//! Firebase Auth provider over the Identity Toolkit REST API.
//!
//! ARCHITECTURE
//! ============
//! Sign-in and sign-up exchange credentials for an id/refresh token pair,
//! persist the resulting session in the durable store, then publish it on
//! the auth-state hub. Start-up reads the persisted session back, so the
//! first resolution reflects the previous run.
//!
//! ERROR HANDLING
//! ==============
//! Identity Toolkit reports refusals as `{"error": {"message": "..."}}`;
//! those surface as `AuthError::Rejected` with the provider's message
//! (`EMAIL_NOT_FOUND`, `INVALID_PASSWORD`, ...). Transport and persistence
//! failures are `AuthError::Provider`.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{AuthError, AuthProvider, AuthStateHub, AuthSubscription, Session};
use crate::config::FirebaseConfig;
use crate::storage::KeyValueStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
}

impl From<TokenResponse> for Session {
    fn from(resp: TokenResponse) -> Self {
        Self { uid: resp.local_id, email: resp.email, id_token: resp.id_token, refresh_token: resp.refresh_token }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a non-success Identity Toolkit response to an [`AuthError`].
pub(crate) fn rejection_from_body(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => AuthError::Rejected(envelope.error.message),
        Err(_) => AuthError::Provider(format!("status {status}: {body}")),
    }
}

/// Decode a successful token response into a session.
pub(crate) fn session_from_body(body: &str) -> Result<Session, AuthError> {
    serde_json::from_str::<TokenResponse>(body)
        .map(Session::from)
        .map_err(|e| AuthError::Provider(format!("unexpected response: {e}")))
}

/// Durable-store key for the persisted user, matching the Firebase web SDK.
#[must_use]
pub fn persistence_key(api_key: &str) -> String {
    format!("firebase:authUser:{api_key}:[DEFAULT]")
}

pub struct FirebaseAuth {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
    persistence: Arc<dyn KeyValueStore>,
    hub: AuthStateHub,
}

impl FirebaseAuth {
    #[must_use]
    pub fn new(config: &FirebaseConfig, http: reqwest::Client, persistence: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.auth_base_url.clone(),
            http,
            persistence,
            hub: AuthStateHub::new(),
        }
    }

    /// Resolve the auth state from the durable store. An unreadable or
    /// corrupt entry resolves to signed-out.
    pub fn restore_persisted_user(&self) {
        let key = persistence_key(&self.api_key);
        let session = match self.persistence.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(error = %e, "persisted firebase user is corrupt; treating as signed out");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "persisted firebase user unreadable; treating as signed out");
                None
            }
        };
        info!(restored = session.is_some(), "firebase auth state resolved");
        self.hub.publish(session);
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] for bad credentials and
    /// [`AuthError::Provider`] for transport or persistence failures.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.exchange("accounts:signInWithPassword", email, password).await
    }

    /// Register a new email/password account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] (e.g. `EMAIL_EXISTS`) or
    /// [`AuthError::Provider`].
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.exchange("accounts:signUp", email, password).await
    }

    async fn exchange(&self, endpoint: &str, email: &str, password: &str) -> Result<Session, AuthError> {
        let resp = self
            .http
            .post(format!("{}/{endpoint}", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        if !status.is_success() {
            return Err(rejection_from_body(status.as_u16(), &body));
        }

        let session = session_from_body(&body)?;
        self.persist(&session)?;
        info!(uid = %session.uid, endpoint, "firebase sign-in succeeded");
        self.hub.publish(Some(session.clone()));
        Ok(session)
    }

    fn persist(&self, session: &Session) -> Result<(), AuthError> {
        let raw = serde_json::to_string(session).map_err(|e| AuthError::Provider(e.to_string()))?;
        self.persistence
            .set(&persistence_key(&self.api_key), raw)
            .map_err(|e| AuthError::Provider(format!("persist user failed: {e}")))
    }
}

#[async_trait::async_trait]
impl AuthProvider for FirebaseAuth {
    fn subscribe(&self) -> Result<AuthSubscription, AuthError> {
        Ok(self.hub.subscribe())
    }

    fn current_session(&self) -> Option<Session> {
        self.hub.current_session()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.persistence
            .remove(&persistence_key(&self.api_key))
            .map_err(|e| AuthError::Provider(format!("clear persisted user failed: {e}")))?;
        self.hub.publish(None);
        info!("firebase sign-out complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
