use super::*;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::Session;
use crate::config::FirebaseConfig;
use crate::firebase::auth::persistence_key;
use crate::storage::KeyValueStore;

fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("unify-app-{}", uuid::Uuid::new_v4()))
}

fn test_config(data_dir: PathBuf) -> AppConfig {
    AppConfig { data_dir, logout_grace_period: Duration::ZERO, ..AppConfig::default() }
}

fn firebase_config() -> FirebaseConfig {
    FirebaseConfig {
        api_key: "test-key".into(),
        auth_domain: "unify.firebaseapp.com".into(),
        project_id: "unify-test".into(),
        storage_bucket: "unify-test.appspot.com".into(),
        messaging_sender_id: "1234".into(),
        app_id: "1:1234:web:abcd".into(),
        auth_base_url: "http://127.0.0.1:9".into(),
    }
}

#[tokio::test]
async fn bootstrap_without_firebase_is_signed_out() {
    let dir = temp_data_dir();
    let app = App::bootstrap(test_config(dir.clone())).unwrap();

    assert!(app.firestore().is_none());
    assert!(app.maps().is_none());
    assert!(!app.gateway().is_signed_in());

    let landed = app.router().push("/settings").await.unwrap();
    assert_eq!(landed.full_path(), "/login?redirect=/settings");

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn bootstrap_with_firebase_restores_persisted_user() {
    let dir = temp_data_dir();
    let firebase = firebase_config();

    {
        let platform = Platform::on_disk(&dir).unwrap();
        let session = Session::new("persisted-uid").with_email("ada@example.com");
        platform.local.set(&persistence_key(&firebase.api_key), serde_json::to_string(&session).unwrap()).unwrap();
    }

    let config = AppConfig { firebase: Some(firebase), ..test_config(dir.clone()) };
    let app = App::bootstrap(config).unwrap();

    assert_eq!(app.firestore().unwrap().project_id(), "unify-test");
    assert_eq!(app.gateway().current_session().unwrap().uid, "persisted-uid");
    assert_eq!(app.router().push("/journal").await.unwrap().name, "journal");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn bootstrap_with_google_key_attaches_maps() {
    let dir = temp_data_dir();
    let config = AppConfig { google_api_key: Some("maps-key".into()), ..test_config(dir.clone()) };
    let app = App::bootstrap(config).unwrap();

    let maps = app.maps().unwrap();
    assert!(maps.script_url().contains("key=maps-key"));
    assert!(!maps.is_loaded());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn resolution_timeout_comes_from_config() {
    let config = AppConfig { auth_resolution_timeout: Duration::from_millis(20), ..AppConfig::default() };
    let provider = Arc::new(MemoryAuthProvider::unresolved());
    let app = App::with_provider(config, Platform::in_memory(), provider);

    assert_eq!(app.gateway().resolution_timeout(), Duration::from_millis(20));
    // Never resolves: the guard treats the user as signed out.
    assert_eq!(app.router().push("/study").await.unwrap().name, "login");
}

#[tokio::test]
async fn logout_uses_app_handles() {
    let provider = Arc::new(MemoryAuthProvider::signed_in(Session::new("u1")));
    let config = AppConfig { logout_grace_period: Duration::ZERO, ..AppConfig::default() };
    let app = App::with_provider(config, Platform::in_memory(), Arc::clone(&provider) as Arc<dyn AuthProvider>);
    app.platform().local.set("draft", "x".into()).unwrap();
    app.router().push("/nutrition").await.unwrap();

    let report = app.logout().await.unwrap();

    assert_eq!(report.listeners_notified, 0);
    assert!(app.platform().local.is_empty().unwrap());
    assert!(!app.gateway().is_signed_in());
    assert_eq!(app.router().current_full_path().as_deref(), Some("/login"));
    assert_eq!(provider.sign_out_calls(), 1);
}
