//! Login/logout flows and the cached user profile.

mod support;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use satchel::auth::CredentialStore;
use satchel::client::ApiClient;
use satchel::config::ClientConfig;
use satchel::error::ClientError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{credentials, MemoryCredentialStore, RecordingNavigator};

fn client(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
    ApiClient::new(ClientConfig::new().with_base_url(server.uri()), store)
        .with_navigator(Arc::new(RecordingNavigator::new()))
}

#[tokio::test]
async fn login_persists_tokens_and_user_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"username": "amina", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "accessToken": "acc-1",
                "refreshToken": "ref-1",
                "user": {"id": 3, "role": "parent", "name": "Amina"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client(&server, Arc::clone(&store));

    let creds = client.login("amina", "pw").await.expect("login");
    assert_eq!(creds.access_token, "acc-1");
    assert_eq!(creds.refresh_token.as_deref(), Some("ref-1"));

    let saved = store.get().expect("persisted");
    assert_eq!(saved.access_token, "acc-1");
    assert_eq!(saved.user.as_ref().unwrap()["role"], "parent");
}

#[tokio::test]
async fn login_rejection_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "AUTH_BAD_CREDENTIALS", "message": "wrong password"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client(&server, Arc::clone(&store));

    let err = client.login("amina", "nope").await.expect_err("should fail");
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "wrong password");
        }
        other => panic!("expected Api, got {other:?}"),
    }
    assert!(store.get().is_none());
}

#[tokio::test]
async fn login_response_without_token_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client(&server, Arc::clone(&store));

    let err = client.login("amina", "pw").await.expect_err("should fail");
    assert!(matches!(err, ClientError::Api { .. }));
    assert!(store.get().is_none());
}

#[tokio::test]
async fn logout_notifies_server_and_clears_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store.seed(credentials("acc-1", Some("ref-1")));
    let client = client(&server, Arc::clone(&store));

    client.logout().await;
    assert!(store.get().is_none());
}

#[tokio::test]
async fn logout_clears_locally_even_when_server_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store.seed(credentials("acc-1", Some("ref-1")));
    let client = client(&server, Arc::clone(&store));

    client.logout().await;
    assert!(store.get().is_none());
}

#[tokio::test]
async fn logout_clears_locally_even_when_server_is_unreachable() {
    let store = Arc::new(MemoryCredentialStore::new());
    store.seed(credentials("acc-1", Some("ref-1")));
    let client = ApiClient::new(
        ClientConfig::new().with_base_url("http://127.0.0.1:9"),
        Arc::<MemoryCredentialStore>::clone(&store),
    );

    client.logout().await;
    assert!(store.get().is_none());
}

#[tokio::test]
async fn logout_without_credentials_skips_the_server_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client(&server, Arc::clone(&store));

    client.logout().await;
    assert!(store.get().is_none());
}

#[tokio::test]
async fn current_user_reads_the_cached_profile() {
    let store = Arc::new(MemoryCredentialStore::new());
    store.seed(
        credentials("acc-1", Some("ref-1"))
            .with_user(json!({"id": 9, "role": "teacher", "name": "Mr. Okoye"})),
    );
    let client = ApiClient::new(ClientConfig::new(), Arc::<MemoryCredentialStore>::clone(&store));

    let user = client.current_user().expect("load").expect("cached user");
    assert_eq!(user["role"], "teacher");

    store.clear().unwrap();
    assert!(client.current_user().expect("load").is_none());
}
