//! Navigation guard gating routes on auth state.
//!
//! STATE MACHINE
//! =============
//! Each navigation runs its own `Pending → Resolving → Decided` pass; no
//! state is shared between navigations, so a second navigation can start
//! while an earlier one is still resolving.
//!
//! - Public (or unclassified) targets go straight to `Decided(Allow)`
//!   without touching the auth provider.
//! - Everything else waits for the gateway's first auth resolution, then:
//!
//! | access       | session | decision          |
//! |--------------|---------|-------------------|
//! | RequiresAuth | absent  | `RedirectToLogin` |
//! | RequiresAuth | present | `Allow`           |
//! | LoginOnly    | present | `RedirectToHome`  |
//! | LoginOnly    | absent  | `Allow`           |
//!
//! The auth subscription is scoped to the gateway call, so it is released
//! before the decision is handed to the router. A failed subscription is
//! logged and decides `Allow`; a navigation always resolves.

use tracing::{debug, info, warn};

use super::routes::{ResolvedRoute, RouteAccess, RouteLocation};
use super::{NavigationHook, NavigationOutcome};
use crate::auth::AuthGateway;

pub const LOGIN_ROUTE: &str = "login";
pub const HOME_ROUTE: &str = "home";
/// Query parameter carrying the originally requested path to the login page.
pub const REDIRECT_QUERY: &str = "redirect";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Resolving,
    Decided(GuardDecision),
}

/// Decision for a non-public target once the session is known.
#[must_use]
pub fn decide(access: RouteAccess, session_present: bool) -> GuardDecision {
    match (access, session_present) {
        (RouteAccess::RequiresAuth, false) => GuardDecision::RedirectToLogin,
        (RouteAccess::LoginOnly, true) => GuardDecision::RedirectToHome,
        (RouteAccess::RequiresAuth, true) | (RouteAccess::LoginOnly, false) | (RouteAccess::Public, _) => {
            GuardDecision::Allow
        }
    }
}

/// Where to go after a successful login, taken from the login route's
/// `redirect` query. Only in-app absolute paths are honored; anything else
/// (missing, `//host`, `https://...`) goes home.
#[must_use]
pub fn post_login_destination(login_route: &ResolvedRoute) -> RouteLocation {
    match login_route.query_value(REDIRECT_QUERY) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => RouteLocation::Path(path.to_owned()),
        _ => RouteLocation::named(HOME_ROUTE),
    }
}

/// One navigation's pass through the state machine.
struct GuardRun<'a> {
    target: &'a ResolvedRoute,
    state: GuardState,
}

impl<'a> GuardRun<'a> {
    fn new(target: &'a ResolvedRoute) -> Self {
        Self { target, state: GuardState::Pending }
    }

    fn advance(&mut self, next: GuardState) {
        debug!(route = self.target.name, from = ?self.state, to = ?next, "guard transition");
        self.state = next;
    }

    fn decide(&mut self, decision: GuardDecision) -> GuardDecision {
        self.advance(GuardState::Decided(decision));
        decision
    }
}

/// Pre-navigation hook enforcing route access classes.
#[derive(Clone)]
pub struct NavigationGuard {
    gateway: AuthGateway,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(gateway: AuthGateway) -> Self {
        Self { gateway }
    }

    /// Run the state machine for one navigation target.
    pub async fn evaluate(&self, to: &ResolvedRoute) -> GuardDecision {
        let mut run = GuardRun::new(to);
        if to.access == RouteAccess::Public {
            return run.decide(GuardDecision::Allow);
        }

        run.advance(GuardState::Resolving);
        match self.gateway.observe_first_resolution().await {
            Ok(session) => run.decide(decide(to.access, session.is_some())),
            Err(e) => {
                warn!(route = to.name, error = %e, "auth resolution failed; allowing navigation");
                run.decide(GuardDecision::Allow)
            }
        }
    }

    /// Translate a decision into the router's outcome.
    #[must_use]
    pub fn outcome(decision: GuardDecision, to: &ResolvedRoute) -> NavigationOutcome {
        match decision {
            GuardDecision::Allow => NavigationOutcome::Proceed,
            GuardDecision::RedirectToLogin => {
                info!(route = to.name, redirect = %to.full_path(), "unauthenticated; redirecting to login");
                NavigationOutcome::Redirect(RouteLocation::named(LOGIN_ROUTE).with_query(REDIRECT_QUERY, to.full_path()))
            }
            GuardDecision::RedirectToHome => {
                info!(route = to.name, "already signed in; redirecting home");
                NavigationOutcome::Redirect(RouteLocation::named(HOME_ROUTE))
            }
        }
    }
}

#[async_trait::async_trait]
impl NavigationHook for NavigationGuard {
    async fn before_each(&self, to: &ResolvedRoute, _from: Option<&ResolvedRoute>) -> NavigationOutcome {
        let decision = self.evaluate(to).await;
        Self::outcome(decision, to)
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
