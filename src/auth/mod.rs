//! Auth-session state for the current user.
//!
//! DESIGN
//! ======
//! Providers publish auth state through an `AuthStateHub`, a `watch`
//! channel whose initial value is `Unresolved`. The provider's first publish
//! (after its local persistence check) marks the state resolved; that is the
//! "first resolution" the navigation guard waits for.
//!
//! Every listener holds an `AuthSubscription`. Dropping it deregisters the
//! listener, so a subscription scoped to one navigation decision is released
//! on every exit path, including early returns and errors.

pub mod gateway;
pub mod memory;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::trace;
use uuid::Uuid;

pub use gateway::AuthGateway;
pub use memory::MemoryAuthProvider;

// =============================================================================
// SESSION
// =============================================================================

/// An authenticated user as reported by the provider. The core only
/// observes sessions; providers create and discard them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Provider-assigned user id.
    pub uid: String,
    pub email: Option<String>,
    /// Short-lived bearer token for backend calls.
    pub id_token: String,
    pub refresh_token: String,
}

impl Session {
    /// A session with no tokens, for providers that do not issue any.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into(), email: None, id_token: String::new(), refresh_token: String::new() }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Tokens are bearer credentials; only whether one is held is shown.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redacted(token: &str) -> &'static str {
            if token.is_empty() { "<none>" } else { "<redacted>" }
        }
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &redacted(&self.id_token))
            .field("refresh_token", &redacted(&self.refresh_token))
            .finish()
    }
}

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by auth providers.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider call failed (network, persistence, HTTP client).
    #[error("auth provider call failed: {0}")]
    Provider(String),

    /// The provider answered but refused the request.
    #[error("auth provider rejected request: {0}")]
    Rejected(String),

    /// A listener could not be registered on the auth-state stream.
    #[error("auth state subscription failed: {0}")]
    Subscription(String),

    /// The provider was dropped while a listener was waiting.
    #[error("auth provider closed")]
    Closed,
}

// =============================================================================
// PROVIDER
// =============================================================================

/// External identity provider as seen by the gateway.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a listener on the auth-state stream. Dropping the returned
    /// subscription unregisters it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Subscription`] if the listener cannot be registered.
    fn subscribe(&self) -> Result<AuthSubscription, AuthError>;

    /// Current session, without waiting for resolution.
    fn current_session(&self) -> Option<Session>;

    /// Invalidate the current session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] when the provider call fails.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

// =============================================================================
// STATE HUB
// =============================================================================

/// Auth state as seen by listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSnapshot {
    /// The provider has not finished its initial check.
    Unresolved,
    Resolved(Option<Session>),
}

/// Publisher side of the auth-state stream, owned by a provider.
#[derive(Debug)]
pub struct AuthStateHub {
    tx: watch::Sender<AuthSnapshot>,
    listeners: Arc<AtomicUsize>,
}

impl AuthStateHub {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::Unresolved);
        Self { tx, listeners: Arc::new(AtomicUsize::new(0)) }
    }

    /// Publish the current session, resolving the stream if it was pending.
    pub fn publish(&self, session: Option<Session>) {
        self.tx.send_replace(AuthSnapshot::Resolved(session));
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        match &*self.tx.borrow() {
            AuthSnapshot::Resolved(session) => session.clone(),
            AuthSnapshot::Unresolved => None,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::new(self.tx.subscribe(), Arc::clone(&self.listeners))
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }
}

impl Default for AuthStateHub {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// A registered auth-state listener. Unregisters itself on drop.
#[derive(Debug)]
pub struct AuthSubscription {
    id: Uuid,
    rx: watch::Receiver<AuthSnapshot>,
    listeners: Arc<AtomicUsize>,
}

impl AuthSubscription {
    fn new(rx: watch::Receiver<AuthSnapshot>, listeners: Arc<AtomicUsize>) -> Self {
        listeners.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::new_v4();
        trace!(subscription = %id, "auth listener registered");
        Self { id, rx, listeners }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the first resolved auth state, returning immediately if the
    /// provider has already resolved.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Closed`] if the provider is dropped first.
    pub async fn first_resolution(&mut self) -> Result<Option<Session>, AuthError> {
        let snapshot = self
            .rx
            .wait_for(|s| matches!(s, AuthSnapshot::Resolved(_)))
            .await
            .map_err(|_| AuthError::Closed)?;
        Ok(match &*snapshot {
            AuthSnapshot::Resolved(session) => session.clone(),
            AuthSnapshot::Unresolved => None,
        })
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.listeners.fetch_sub(1, Ordering::SeqCst);
        trace!(subscription = %self.id, "auth listener released");
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
