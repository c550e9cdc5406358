//! In-memory auth provider.
//!
//! Used when Firebase is not configured and as the deterministic provider in
//! tests: callers decide when the state resolves, who is signed in, and
//! whether the next sign-out or subscription fails.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::info;

use super::{AuthError, AuthProvider, AuthStateHub, AuthSubscription, Session};

#[derive(Debug, Default)]
pub struct MemoryAuthProvider {
    hub: AuthStateHub,
    sign_out_failure: Mutex<Option<String>>,
    fail_subscriptions: AtomicBool,
    subscriptions_opened: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl MemoryAuthProvider {
    /// A provider that has not resolved yet; listeners wait until
    /// [`resolve`](Self::resolve) or [`sign_in`](Self::sign_in).
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// A provider resolved with no signed-in user.
    #[must_use]
    pub fn signed_out() -> Self {
        let provider = Self::default();
        provider.hub.publish(None);
        provider
    }

    /// A provider resolved with `session` signed in.
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        let provider = Self::default();
        provider.hub.publish(Some(session));
        provider
    }

    pub fn resolve(&self, session: Option<Session>) {
        self.hub.publish(session);
    }

    pub fn sign_in(&self, session: Session) {
        info!(uid = %session.uid, "signed in");
        self.hub.publish(Some(session));
    }

    /// Make the next `sign_out` fail with [`AuthError::Provider`].
    pub fn fail_next_sign_out(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.sign_out_failure.lock() {
            *failure = Some(message.into());
        }
    }

    /// Make every `subscribe` call fail while `fail` is set.
    pub fn fail_subscriptions(&self, fail: bool) {
        self.fail_subscriptions.store(fail, Ordering::SeqCst);
    }

    /// Live auth-state listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.hub.listener_count()
    }

    /// Subscriptions opened over the provider's lifetime.
    #[must_use]
    pub fn subscriptions_opened(&self) -> usize {
        self.subscriptions_opened.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthProvider for MemoryAuthProvider {
    fn subscribe(&self) -> Result<AuthSubscription, AuthError> {
        if self.fail_subscriptions.load(Ordering::SeqCst) {
            return Err(AuthError::Subscription("subscriptions disabled".into()));
        }
        self.subscriptions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(self.hub.subscribe())
    }

    fn current_session(&self) -> Option<Session> {
        self.hub.current_session()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .sign_out_failure
            .lock()
            .map_err(|_| AuthError::Provider("sign-out state poisoned".into()))?
            .take();
        if let Some(message) = failure {
            return Err(AuthError::Provider(message));
        }
        self.hub.publish(None);
        info!("signed out");
        Ok(())
    }
}
