//! Logout: ordered teardown of the signed-in session.
//!
//! DESIGN
//! ======
//! Teardown is a fixed pipeline; each step is awaited before the next:
//! 1. `NotifyListeners`: dispatch `AppEvent::BeforeLogout` (fire-and-forget).
//! 2. `GracePeriod`: short sleep so listeners can flush in-flight writes.
//! 3. `SignOut`: invalidate the session through the gateway.
//! 4. `ClearStorage`: clear the durable and session key-value stores.
//! 5. `PurgeCaches`: delete every named cache, if cache storage exists.
//! 6. `RedirectToLogin`: replace the current history entry with login, so
//!    "back" cannot return to an authenticated view.
//!
//! ERROR HANDLING
//! ==============
//! A failing step stops the pipeline and is reported as `LogoutError`
//! naming that step. Nothing runs after a failed sign-out, so storage stays
//! intact and the user stays on the current page. Later failures can leave
//! storage partially cleared; the step name says how far teardown got.
//! `perform` logs the failure instead of returning it. No step is retried.

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::auth::{AuthError, AuthGateway};
use crate::events::AppEvent;
use crate::platform::Platform;
use crate::router::guard::LOGIN_ROUTE;
use crate::router::{NavigationError, RouteLocation, Router};
use crate::storage::StorageError;

pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutStep {
    NotifyListeners,
    GracePeriod,
    SignOut,
    ClearStorage,
    PurgeCaches,
    RedirectToLogin,
}

impl LogoutStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotifyListeners => "notify_listeners",
            Self::GracePeriod => "grace_period",
            Self::SignOut => "sign_out",
            Self::ClearStorage => "clear_storage",
            Self::PurgeCaches => "purge_caches",
            Self::RedirectToLogin => "redirect_to_login",
        }
    }
}

impl fmt::Display for LogoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LogoutStepError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

#[derive(Debug, thiserror::Error)]
#[error("logout failed at {step}: {source}")]
pub struct LogoutError {
    pub step: LogoutStep,
    #[source]
    pub source: LogoutStepError,
}

impl LogoutError {
    fn at(step: LogoutStep, source: impl Into<LogoutStepError>) -> Self {
        Self { step, source: source.into() }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// What a completed (or partially completed) teardown did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutReport {
    pub completed: Vec<LogoutStep>,
    /// Listeners reached by the `BeforeLogout` dispatch.
    pub listeners_notified: usize,
    /// `None` when the platform has no cache storage.
    pub caches_removed: Option<Vec<String>>,
}

// =============================================================================
// SEQUENCE
// =============================================================================

#[derive(Clone)]
pub struct LogoutSequence {
    gateway: AuthGateway,
    platform: Platform,
    router: Router,
    grace_period: Duration,
}

impl LogoutSequence {
    #[must_use]
    pub fn new(gateway: AuthGateway, platform: Platform, router: Router) -> Self {
        Self { gateway, platform, router, grace_period: DEFAULT_GRACE_PERIOD }
    }

    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Run the teardown pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first failing step with its cause.
    pub async fn run(&self) -> Result<LogoutReport, LogoutError> {
        let mut report = LogoutReport {
            listeners_notified: self.platform.events.dispatch(AppEvent::BeforeLogout),
            ..LogoutReport::default()
        };
        debug!(listeners = report.listeners_notified, "logout starting");
        report.completed.push(LogoutStep::NotifyListeners);

        tokio::time::sleep(self.grace_period).await;
        report.completed.push(LogoutStep::GracePeriod);

        self.gateway
            .sign_out()
            .await
            .map_err(|e| LogoutError::at(LogoutStep::SignOut, e))?;
        report.completed.push(LogoutStep::SignOut);

        self.clear_storage()
            .map_err(|e| LogoutError::at(LogoutStep::ClearStorage, e))?;
        report.completed.push(LogoutStep::ClearStorage);

        report.caches_removed = self
            .purge_caches()
            .await
            .map_err(|e| LogoutError::at(LogoutStep::PurgeCaches, e))?;
        report.completed.push(LogoutStep::PurgeCaches);

        self.router
            .replace(RouteLocation::named(LOGIN_ROUTE))
            .await
            .map_err(|e| LogoutError::at(LogoutStep::RedirectToLogin, e))?;
        report.completed.push(LogoutStep::RedirectToLogin);

        Ok(report)
    }

    /// Run the pipeline, logging instead of returning a failure.
    pub async fn perform(&self) -> Option<LogoutReport> {
        match self.run().await {
            Ok(report) => {
                info!(
                    caches_removed = report.caches_removed.as_ref().map_or(0, Vec::len),
                    "logout complete"
                );
                Some(report)
            }
            Err(e) => {
                error!(step = %e.step, error = %e, "logout failed");
                None
            }
        }
    }

    fn clear_storage(&self) -> Result<(), StorageError> {
        self.platform.local.clear()?;
        self.platform.session.clear()
    }

    async fn purge_caches(&self) -> Result<Option<Vec<String>>, StorageError> {
        let Some(caches) = &self.platform.caches else {
            debug!("cache storage unavailable; skipping cache purge");
            return Ok(None);
        };

        let names = caches.keys().await?;
        futures::future::try_join_all(names.iter().map(|name| caches.delete(name))).await?;
        Ok(Some(names))
    }
}

#[cfg(test)]
#[path = "logout_test.rs"]
mod tests;
