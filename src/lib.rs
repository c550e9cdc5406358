//! Unify client shell: auth-gated navigation, session teardown and
//! third-party bootstrap (Firebase, Google Maps).
//!
//! ARCHITECTURE
//! ============
//! - `auth`: provider-neutral session state, the `AuthGateway` used by the
//!   guard and logout, and an in-memory provider.
//! - `firebase`: Firebase app bootstrap and the Identity Toolkit provider.
//! - `router`: route table, history, location parsing and the navigation
//!   guard that gates routes on auth state.
//! - `logout`: ordered teardown pipeline (notify, wait, sign out, purge).
//! - `storage` / `platform`: key-value and cache stores the client persists
//!   into, bundled with the app event bus.
//! - `maps`: one-shot Google Maps script loader.

pub mod app;
pub mod auth;
pub mod config;
pub mod events;
pub mod firebase;
pub mod logout;
pub mod maps;
pub mod platform;
pub mod router;
pub mod storage;
