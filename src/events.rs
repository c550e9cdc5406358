//! App-global event bus.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components that hold in-flight work (draft autosave, pending writes)
//! subscribe here to react before the session is torn down. Dispatch is
//! fire-and-forget: the sender never waits on listeners.

use tokio::sync::broadcast;

const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Events broadcast to local listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Logout is starting; flush anything tied to the current session.
    BeforeLogout,
}

/// Broadcast channel for [`AppEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self { tx }
    }

    /// Register a listener. Events dispatched before this call are not seen.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Dispatch `event` to every current listener. Returns how many
    /// listeners were reached; zero listeners is not an error.
    pub fn dispatch(&self, event: AppEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
