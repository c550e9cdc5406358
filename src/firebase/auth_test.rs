use super::*;
use crate::storage::{MemoryStore, StorageError};

fn test_config() -> FirebaseConfig {
    FirebaseConfig {
        api_key: "key-123".into(),
        auth_domain: "unify.firebaseapp.com".into(),
        project_id: "unify".into(),
        storage_bucket: "unify.appspot.com".into(),
        messaging_sender_id: "42".into(),
        app_id: "1:42:web:abc".into(),
        auth_base_url: "http://127.0.0.1:9".into(),
    }
}

fn auth_with(store: Arc<dyn KeyValueStore>) -> FirebaseAuth {
    FirebaseAuth::new(&test_config(), reqwest::Client::new(), store)
}

fn auth_at(base_url: String, store: Arc<dyn KeyValueStore>) -> FirebaseAuth {
    let config = FirebaseConfig { auth_base_url: base_url, ..test_config() };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    FirebaseAuth::new(&config, http, store)
}

/// Serve one canned HTTP response on an ephemeral port. The handle yields
/// the raw request (head and body) that was received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some((head, rest)) = text.split_once("\r\n\r\n") {
                let content_length = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if rest.len() >= content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&raw).into_owned()
    });

    (base_url, handle)
}

const TOKEN_BODY: &str = r#"{"kind":"identitytoolkit#VerifyPasswordResponse","localId":"uid-7","email":"ada@example.com","idToken":"id-tok","refreshToken":"ref-tok","expiresIn":"3600"}"#;

/// Store whose writes always fail.
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }
    fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Poisoned)
    }
    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Poisoned)
    }
    fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::Poisoned)
    }
    fn len(&self) -> Result<usize, StorageError> {
        Ok(0)
    }
}

// =============================================================================
// response parsing
// =============================================================================

#[test]
fn session_from_token_response() {
    let body = r#"{
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": "uid-1",
        "email": "a@b.com",
        "idToken": "id-tok",
        "refreshToken": "ref-tok",
        "expiresIn": "3600",
        "registered": true
    }"#;
    let session = session_from_body(body).unwrap();
    assert_eq!(session.uid, "uid-1");
    assert_eq!(session.email.as_deref(), Some("a@b.com"));
    assert_eq!(session.id_token, "id-tok");
    assert_eq!(session.refresh_token, "ref-tok");
}

#[test]
fn session_from_malformed_body_is_provider_error() {
    assert!(matches!(session_from_body("{}"), Err(AuthError::Provider(_))));
}

#[test]
fn rejection_uses_provider_message() {
    let body = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[]}}"#;
    let err = rejection_from_body(400, body);
    assert!(matches!(err, AuthError::Rejected(ref m) if m == "EMAIL_NOT_FOUND"));
}

#[test]
fn rejection_with_unknown_body_keeps_status() {
    let err = rejection_from_body(502, "<html>bad gateway</html>");
    assert!(err.to_string().contains("502"));
}

#[test]
fn persistence_key_matches_web_sdk_format() {
    assert_eq!(persistence_key("abc"), "firebase:authUser:abc:[DEFAULT]");
}

// =============================================================================
// persistence
// =============================================================================

#[test]
fn restore_without_persisted_user_resolves_signed_out() {
    let auth = auth_with(Arc::new(MemoryStore::new()));
    auth.restore_persisted_user();
    assert_eq!(auth.hub.snapshot(), crate::auth::AuthSnapshot::Resolved(None));
}

#[test]
fn restore_reads_persisted_user() {
    let store = Arc::new(MemoryStore::new());
    let session = Session::new("uid-9").with_email("x@y.z");
    store
        .set(&persistence_key("key-123"), serde_json::to_string(&session).unwrap())
        .unwrap();

    let auth = auth_with(store);
    auth.restore_persisted_user();
    assert_eq!(auth.current_session(), Some(session));
}

#[test]
fn restore_corrupt_user_resolves_signed_out() {
    let store = Arc::new(MemoryStore::new());
    store.set(&persistence_key("key-123"), "{oops".into()).unwrap();

    let auth = auth_with(store);
    auth.restore_persisted_user();
    assert_eq!(auth.hub.snapshot(), crate::auth::AuthSnapshot::Resolved(None));
}

#[tokio::test]
async fn sign_out_removes_persisted_user() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(&persistence_key("key-123"), serde_json::to_string(&Session::new("u")).unwrap())
        .unwrap();
    store.set("unrelated", "kept".into()).unwrap();

    let auth = auth_with(store.clone());
    auth.restore_persisted_user();
    auth.sign_out().await.unwrap();

    assert_eq!(auth.current_session(), None);
    assert_eq!(store.get(&persistence_key("key-123")).unwrap(), None);
    assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("kept"));
}

#[tokio::test]
async fn sign_out_fails_when_store_rejects_write() {
    let auth = auth_with(Arc::new(ReadOnlyStore));
    auth.hub.publish(Some(Session::new("u")));

    let err = auth.sign_out().await.unwrap_err();
    assert!(matches!(err, AuthError::Provider(_)));
    assert!(auth.current_session().is_some());
}

#[tokio::test]
async fn sign_in_transport_failure_is_provider_error() {
    let auth = auth_with(Arc::new(MemoryStore::new()));
    auth.restore_persisted_user();

    let err = auth.sign_in_with_password("a@b.com", "pw").await.unwrap_err();
    assert!(matches!(err, AuthError::Provider(_)));
    assert_eq!(auth.current_session(), None);
}

// =============================================================================
// credential exchange
// =============================================================================

#[tokio::test]
async fn sign_in_persists_and_publishes_session() {
    let (base_url, server) = serve_once("200 OK", TOKEN_BODY).await;
    let store = Arc::new(MemoryStore::new());
    let auth = auth_at(base_url, store.clone());
    auth.restore_persisted_user();

    let session = auth.sign_in_with_password("ada@example.com", "pw").await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("POST /accounts:signInWithPassword?key=key-123 "), "{request}");
    assert!(request.contains(r#""returnSecureToken":true"#), "{request}");
    assert_eq!(session.uid, "uid-7");
    assert_eq!(session.id_token, "id-tok");
    assert_eq!(auth.current_session(), Some(session.clone()));

    let persisted = store.get(&persistence_key("key-123")).unwrap().unwrap();
    assert_eq!(serde_json::from_str::<Session>(&persisted).unwrap(), session);
}

#[tokio::test]
async fn sign_up_rejection_maps_to_rejected() {
    let (base_url, server) = serve_once("400 Bad Request", r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#).await;
    let store = Arc::new(MemoryStore::new());
    let auth = auth_at(base_url, store.clone());
    auth.restore_persisted_user();

    let err = auth.sign_up("ada@example.com", "pw").await.unwrap_err();
    let request = server.await.unwrap();

    assert!(request.starts_with("POST /accounts:signUp?key=key-123 "), "{request}");
    assert!(matches!(err, AuthError::Rejected(ref m) if m == "EMAIL_EXISTS"));
    assert_eq!(auth.current_session(), None);
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn sign_in_that_cannot_persist_does_not_publish() {
    let (base_url, server) = serve_once("200 OK", TOKEN_BODY).await;
    let auth = auth_at(base_url, Arc::new(ReadOnlyStore));
    auth.restore_persisted_user();

    let err = auth.sign_in_with_password("ada@example.com", "pw").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, AuthError::Provider(_)));
    assert_eq!(auth.current_session(), None);
}
