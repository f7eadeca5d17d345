//! Integration tests for the Asrama admin client.
//!
//! Each scenario runs the real session store, file-backed token storage and
//! gateway against a `wiremock` stand-in for the backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p asrama-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_flow` - Login, restore, logout and expiry
//! - `management` - Form-driven writes through the gateway

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use asrama_token_admin::{
    ApiClient, FileTokenStore, MemoryNavigator, SessionStore, TokenStore,
};

/// Stub backend plus a client wired to it with on-disk token storage.
pub struct TestContext {
    pub server: MockServer,
    pub client: ApiClient,
    pub navigator: Arc<MemoryNavigator>,
    pub state_dir: TempDir,
}

impl TestContext {
    /// Start a stub backend and an anonymous client.
    ///
    /// # Panics
    ///
    /// Panics if the temp dir or client cannot be created.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let state_dir = tempfile::tempdir().expect("Failed to create state dir");
        let (client, navigator) = connect(&server, &state_dir);
        Self {
            server,
            client,
            navigator,
            state_dir,
        }
    }

    /// A fresh process sharing this context's state directory and backend.
    ///
    /// The returned client has not been initialized.
    #[must_use]
    pub fn restart(&self) -> (ApiClient, Arc<MemoryNavigator>) {
        connect(&self.server, &self.state_dir)
    }

    /// The token currently on disk.
    ///
    /// # Panics
    ///
    /// Panics if the token file cannot be read.
    #[must_use]
    pub fn stored_token(&self) -> Option<String> {
        FileTokenStore::new(self.state_dir.path())
            .load()
            .expect("Failed to read token file")
    }

    /// Answer `POST /api/login` with `token`.
    pub async fn accept_login(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
            .mount(&self.server)
            .await;
    }

    /// Answer `POST /api/login` with an error response.
    pub async fn reject_login(&self, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

fn connect(server: &MockServer, state_dir: &TempDir) -> (ApiClient, Arc<MemoryNavigator>) {
    let navigator = Arc::new(MemoryNavigator::new());
    let session = SessionStore::new(
        Arc::new(FileTokenStore::new(state_dir.path())),
        navigator.clone(),
    );
    let base = Url::parse(&format!("{}/api/", server.uri())).expect("Invalid mock server URL");
    let client = ApiClient::with_base_url(base, session).expect("Failed to build client");
    (client, navigator)
}

/// An unsigned token for `role` expiring `ttl_secs` from now (or never).
#[must_use]
pub fn token_for(role: &str, ttl_secs: Option<i64>) -> String {
    let mut payload = json!({
        "id": 1,
        "name": "Admin Asrama",
        "email": "admin@unair.ac.id",
        "role": role,
        "avatar": "/uploads/images/admin.png",
        "iat": chrono::Utc::now().timestamp()
    });
    if let Some(ttl) = ttl_secs {
        payload["exp"] = json!(chrono::Utc::now().timestamp() + ttl);
    }
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

/// A valid admin token good for an hour.
#[must_use]
pub fn admin_token() -> String {
    token_for("admin", Some(3600))
}

/// A valid operator token good for an hour.
#[must_use]
pub fn operator_token() -> String {
    token_for("operator", Some(3600))
}
