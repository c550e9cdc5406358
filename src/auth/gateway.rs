//! Single point of truth for "is a user signed in?".
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigation guard and the logout pipeline both go through the gateway
//! instead of talking to a provider directly, so tests can swap in
//! `MemoryAuthProvider` and drive auth state deterministically.
//!
//! TRADE-OFFS
//! ==========
//! First-resolution waits are bounded. A provider that never emits would
//! otherwise stall navigation forever; on timeout the session is reported
//! absent, which at worst sends the user to the login page.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{AuthError, AuthProvider, Session};

pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AuthGateway {
    provider: Arc<dyn AuthProvider>,
    resolution_timeout: Duration,
}

impl AuthGateway {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider, resolution_timeout: DEFAULT_RESOLUTION_TIMEOUT }
    }

    #[must_use]
    pub fn with_resolution_timeout(mut self, timeout: Duration) -> Self {
        self.resolution_timeout = timeout;
        self
    }

    #[must_use]
    pub fn resolution_timeout(&self) -> Duration {
        self.resolution_timeout
    }

    /// Current session snapshot. `None` also while the provider is still
    /// resolving.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.provider.current_session()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.current_session().is_some()
    }

    /// Subscribe, wait for the first resolved auth state, unsubscribe.
    ///
    /// The subscription lives only inside this call and is released before
    /// the result is returned, whether it resolved, timed out or failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be registered or the
    /// provider closes while waiting.
    pub async fn observe_first_resolution(&self) -> Result<Option<Session>, AuthError> {
        let mut subscription = self.provider.subscribe()?;
        debug!(subscription = %subscription.id(), "awaiting first auth resolution");

        let resolved = if let Ok(result) = tokio::time::timeout(self.resolution_timeout, subscription.first_resolution()).await {
            result
        } else {
            warn!(
                timeout_ms = u64::try_from(self.resolution_timeout.as_millis()).unwrap_or(u64::MAX),
                "auth resolution timed out; treating session as absent"
            );
            Ok(None)
        };

        drop(subscription);
        resolved
    }

    /// Invalidate the current session via the provider.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] when the provider call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
