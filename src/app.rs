//! Application assembly.
//!
//! DESIGN
//! ======
//! `App` wires config into live handles: platform stores, the auth provider
//! (Firebase when configured, otherwise in-memory), the gateway, a router
//! with the navigation guard installed, and the optional maps loader.
//! Clone is cheap; every field is Arc-wrapped or Clone.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthError, AuthGateway, AuthProvider, MemoryAuthProvider};
use crate::config::AppConfig;
use crate::firebase::{FirebaseApp, Firestore};
use crate::logout::{LogoutReport, LogoutSequence};
use crate::maps::{HttpScriptLoader, MapsError, MapsLoader};
use crate::platform::Platform;
use crate::router::{NavigationGuard, RouteTable, Router};
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("auth: {0}")]
    Auth(#[from] AuthError),
    #[error("maps: {0}")]
    Maps(#[from] MapsError),
}

#[derive(Clone)]
pub struct App {
    config: AppConfig,
    platform: Platform,
    gateway: AuthGateway,
    router: Router,
    firestore: Option<Firestore>,
    maps: Option<Arc<MapsLoader>>,
}

impl App {
    /// Boot from config: on-disk platform under `data_dir`, Firebase auth
    /// when configured, the HTTP maps loader when a Google key is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store cannot be loaded or an HTTP
    /// client cannot be built.
    pub fn bootstrap(config: AppConfig) -> Result<Self, AppError> {
        let platform = Platform::on_disk(&config.data_dir)?;

        let (provider, firestore): (Arc<dyn AuthProvider>, Option<Firestore>) = match &config.firebase {
            Some(firebase) => {
                let firebase = FirebaseApp::initialize(firebase.clone(), Arc::clone(&platform.local))?;
                let auth: Arc<dyn AuthProvider> = firebase.auth();
                (auth, Some(firebase.firestore().clone()))
            }
            None => {
                warn!("firebase not configured; using in-memory auth provider");
                let memory: Arc<dyn AuthProvider> = Arc::new(MemoryAuthProvider::signed_out());
                (memory, None)
            }
        };

        let maps = match &config.google_api_key {
            Some(key) => Some(Arc::new(MapsLoader::new(key.clone(), Arc::new(HttpScriptLoader::new()?)))),
            None => None,
        };

        let mut app = Self::with_provider(config, platform, provider);
        app.firestore = firestore;
        app.maps = maps;
        Ok(app)
    }

    /// Assemble around an existing platform and provider. No Firestore
    /// handle or maps loader is attached.
    #[must_use]
    pub fn with_provider(config: AppConfig, platform: Platform, provider: Arc<dyn AuthProvider>) -> Self {
        let gateway = AuthGateway::new(provider).with_resolution_timeout(config.auth_resolution_timeout);
        let router = Router::new(RouteTable::unify(), vec![Arc::new(NavigationGuard::new(gateway.clone()))]);
        info!(data_dir = %config.data_dir.display(), "app assembled");
        Self { config, platform, gateway, router, firestore: None, maps: None }
    }

    #[must_use]
    pub fn with_maps(mut self, maps: MapsLoader) -> Self {
        self.maps = Some(Arc::new(maps));
        self
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    #[must_use]
    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn firestore(&self) -> Option<&Firestore> {
        self.firestore.as_ref()
    }

    #[must_use]
    pub fn maps(&self) -> Option<&MapsLoader> {
        self.maps.as_deref()
    }

    #[must_use]
    pub fn logout_sequence(&self) -> LogoutSequence {
        LogoutSequence::new(self.gateway.clone(), self.platform.clone(), self.router.clone())
            .with_grace_period(self.config.logout_grace_period)
    }

    /// Tear the session down; failures are logged, not returned.
    pub async fn logout(&self) -> Option<LogoutReport> {
        self.logout_sequence().perform().await
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
