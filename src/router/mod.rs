//! Client-side router: route resolution, pre-navigation hooks, history.
//!
//! DESIGN
//! ======
//! A navigation resolves its target against the `RouteTable`, runs every
//! registered `NavigationHook` in order, then commits the route to history
//! and updates the document title. A hook may proceed, cancel, or redirect;
//! a redirect restarts the pipeline for the new target (bounded by
//! `MAX_REDIRECTS`) with the original push/replace mode.
//!
//! CONCURRENCY
//! ===========
//! Navigations may overlap while a hook awaits auth state. Each navigation
//! takes a ticket; only the most recently started navigation may commit.
//! An older one that finishes later is reported as `Superseded` and leaves
//! history untouched. The hook itself is not cancelled.

pub mod guard;
pub mod history;
pub mod location;
pub mod routes;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

pub use guard::{GuardDecision, NavigationGuard, post_login_destination};
pub use history::History;
pub use location::Location;
pub use routes::{ResolvedRoute, RouteAccess, RouteDef, RouteLocation, RoutePattern, RouteTable, ViewLoading};

pub const APP_TITLE: &str = "Unify";
pub const MAX_REDIRECTS: usize = 10;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// A hook declined the navigation.
    #[error("navigation to {0} aborted by guard")]
    Aborted(String),

    /// A newer navigation started before this one committed.
    #[error("navigation to {0} superseded by a newer navigation")]
    Superseded(String),

    #[error("redirect loop: {hops} redirects, last target {target}")]
    RedirectLoop { hops: usize, target: String },

    #[error("no route named {0}")]
    UnknownRoute(String),

    #[error("no route matches {0}")]
    NoMatch(String),

    #[error("route {0} has no static path")]
    NoStaticPath(String),

    #[error("duplicate route name {0}")]
    DuplicateRoute(String),
}

// =============================================================================
// HOOKS
// =============================================================================

/// What a pre-navigation hook wants done with the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Proceed,
    Redirect(RouteLocation),
    Cancel,
}

/// Hook invoked before every navigation commits.
#[async_trait::async_trait]
pub trait NavigationHook: Send + Sync {
    async fn before_each(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>) -> NavigationOutcome;
}

/// Document title for a route title.
#[must_use]
pub fn document_title(title: Option<&str>) -> String {
    match title {
        Some(title) => format!("{title} • {APP_TITLE}"),
        None => APP_TITLE.to_owned(),
    }
}

// =============================================================================
// ROUTER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
}

struct RouterState {
    history: History,
    current: Option<ResolvedRoute>,
    title: String,
    scroll_top: u32,
}

struct RouterInner {
    table: RouteTable,
    hooks: Vec<Arc<dyn NavigationHook>>,
    state: Mutex<RouterState>,
    latest_ticket: AtomicU64,
}

/// Shared router handle. Clones drive the same history.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    #[must_use]
    pub fn new(table: RouteTable, hooks: Vec<Arc<dyn NavigationHook>>) -> Self {
        let state = RouterState { history: History::new(), current: None, title: APP_TITLE.to_owned(), scroll_top: 0 };
        Self {
            inner: Arc::new(RouterInner { table, hooks, state: Mutex::new(state), latest_ticket: AtomicU64::new(0) }),
        }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.inner.table
    }

    /// Navigate to `to`, adding a history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be resolved, a hook cancels,
    /// redirects loop, or a newer navigation supersedes this one.
    pub async fn push(&self, to: impl Into<RouteLocation>) -> Result<ResolvedRoute, NavigationError> {
        self.navigate(to.into(), HistoryMode::Push).await
    }

    /// Navigate to `to`, replacing the current history entry.
    ///
    /// # Errors
    ///
    /// Same as [`push`](Self::push).
    pub async fn replace(&self, to: impl Into<RouteLocation>) -> Result<ResolvedRoute, NavigationError> {
        self.navigate(to.into(), HistoryMode::Replace).await
    }

    #[must_use]
    pub fn current(&self) -> Option<ResolvedRoute> {
        self.lock_state().current.clone()
    }

    #[must_use]
    pub fn current_full_path(&self) -> Option<String> {
        self.lock_state().current.as_ref().map(ResolvedRoute::full_path)
    }

    #[must_use]
    pub fn document_title(&self) -> String {
        self.lock_state().title.clone()
    }

    #[must_use]
    pub fn scroll_top(&self) -> u32 {
        self.lock_state().scroll_top
    }

    /// Record the view's scroll offset; reset on every committed navigation.
    pub fn set_scroll_top(&self, offset: u32) {
        self.lock_state().scroll_top = offset;
    }

    /// Full paths of every history entry, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock_state().history.full_paths()
    }

    /// The entry a "back" navigation would return to.
    #[must_use]
    pub fn previous_entry(&self) -> Option<String> {
        self.lock_state().history.previous().map(Location::full_path)
    }

    async fn navigate(&self, mut target: RouteLocation, mode: HistoryMode) -> Result<ResolvedRoute, NavigationError> {
        let ticket = self.inner.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let mut redirects = 0;

        loop {
            let to = self.inner.table.resolve(&target)?;
            let from = self.current();

            match self.run_hooks(&to, from.as_ref()).await {
                NavigationOutcome::Proceed => {}
                NavigationOutcome::Cancel => {
                    info!(route = to.name, path = %to.full_path(), "navigation cancelled");
                    return Err(NavigationError::Aborted(to.full_path()));
                }
                NavigationOutcome::Redirect(next) => {
                    redirects += 1;
                    if redirects > MAX_REDIRECTS {
                        return Err(NavigationError::RedirectLoop { hops: redirects - 1, target: to.full_path() });
                    }
                    target = next;
                    continue;
                }
            }

            if self.inner.latest_ticket.load(Ordering::SeqCst) != ticket {
                info!(route = to.name, path = %to.full_path(), "navigation superseded");
                return Err(NavigationError::Superseded(to.full_path()));
            }

            self.commit(&to, mode);
            return Ok(to);
        }
    }

    async fn run_hooks(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>) -> NavigationOutcome {
        for hook in &self.inner.hooks {
            match hook.before_each(to, from).await {
                NavigationOutcome::Proceed => {}
                other => return other,
            }
        }
        NavigationOutcome::Proceed
    }

    fn commit(&self, to: &ResolvedRoute, mode: HistoryMode) {
        let mut state = self.lock_state();
        match mode {
            HistoryMode::Push => state.history.push(to.location.clone()),
            HistoryMode::Replace => state.history.replace(to.location.clone()),
        }
        state.current = Some(to.clone());
        state.title = document_title(to.title);
        state.scroll_top = 0;
        info!(route = to.name, path = %to.full_path(), ?mode, "navigation committed");
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RouterState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
