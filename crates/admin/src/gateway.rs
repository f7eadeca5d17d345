//! Outbound HTTP client for the token backend.
//!
//! Every authorized request goes through [`ApiClient::send`]: the session
//! token is attached when present, and an HTTP 401 invalidates the session
//! before the error reaches the caller. Views never handle 401 themselves.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::SessionStore;
use crate::auth::session::bearer;
use crate::config::AdminConfig;
use crate::error::{ApiError, ErrorBody};

/// An outgoing request and the session token it was built with.
pub(crate) struct AuthorizedRequest {
    builder: RequestBuilder,
    token: Option<SecretString>,
}

impl AuthorizedRequest {
    fn json<B: Serialize + ?Sized>(self, body: &B) -> Self {
        Self {
            builder: self.builder.json(body),
            token: self.token,
        }
    }

    fn multipart(self, form: reqwest::multipart::Form) -> Self {
        Self {
            builder: self.builder.multipart(form),
            token: self.token,
        }
    }
}

/// Backend REST client. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    asset_host: Url,
    session: SessionStore,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &AdminConfig, session: SessionStore) -> Result<Self, ApiError> {
        Self::build(
            config.api_base_url.clone(),
            config.asset_host.clone(),
            config.http_timeout,
            session,
        )
    }

    /// Create a client for `base_url`, serving assets from its origin.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: Url, session: SessionStore) -> Result<Self, ApiError> {
        let mut asset_host = base_url.clone();
        asset_host.set_path("/");
        Self::build(base_url, asset_host, Duration::from_secs(30), session)
    }

    fn build(
        mut base_url: Url,
        asset_host: Url,
        timeout: Duration,
        session: SessionStore,
    ) -> Result<Self, ApiError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                asset_host,
                session,
            }),
        })
    }

    /// The session this client reads its token from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Absolute URL for an asset path returned by the backend.
    ///
    /// Absolute URLs pass through; relative paths are resolved against the
    /// asset host.
    #[must_use]
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        self.inner
            .asset_host
            .join(path.trim_start_matches('/'))
            .map_or_else(|_| path.to_string(), String::from)
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.inner.base_url.join(path.trim_start_matches('/'))
    }

    /// Start an authorized request. Sent unauthenticated if there is no
    /// session.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<AuthorizedRequest, ApiError> {
        let mut builder = self.inner.client.request(method, self.url(path)?);
        let token = self.inner.session.token();
        if let Some(token) = &token {
            builder = builder.header(header::AUTHORIZATION, bearer(token));
        }
        Ok(AuthorizedRequest { builder, token })
    }

    /// Start a request that bypasses the session entirely: no token is
    /// attached and a 401 is not treated as a session rejection.
    pub(crate) fn public_request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, url::ParseError> {
        Ok(self.inner.client.request(method, self.url(path)?))
    }

    /// Send an authorized request.
    ///
    /// HTTP 401 invalidates the session, unless it has moved on to another
    /// token since the request was built, and returns
    /// `ApiError::Unauthorized`. Other non-success statuses become
    /// `ApiError::Api`.
    pub(crate) async fn send(&self, request: AuthorizedRequest) -> Result<Response, ApiError> {
        let response = match request.builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from(e);
                err.report();
                return Err(err);
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "Backend rejected session token");
            self.inner.session.reject_token(request.token.as_ref());
            return Err(ApiError::Unauthorized);
        }
        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".into());
        let body = ErrorBody::parse(&text);
        let err = ApiError::Api {
            status: status.as_u16(),
            code: body.error_code.clone(),
            message: body
                .message()
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string()),
        };
        err.report();
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: AuthorizedRequest) -> Result<T, ApiError> {
        Ok(self.send(request).await?.json().await?)
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// `GET` and decode JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per [`send`](Self::send), or `ApiError::Http` if
    /// the body does not decode.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::GET, path)?).await
    }

    /// `POST` a JSON body and decode JSON.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(self.request(Method::POST, path)?.json(body))
            .await
    }

    /// `PUT` a JSON body and decode JSON.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(self.request(Method::PUT, path)?.json(body))
            .await
    }

    /// `PATCH` without a body and decode JSON.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::PATCH, path)?).await
    }

    /// `DELETE`, discarding any body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per [`send`](Self::send).
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    /// `POST` a multipart form and decode JSON.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        self.send_json(self.request(Method::POST, path)?.multipart(form))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::navigation::{LoginReason, MemoryNavigator, Route};
    use crate::storage::{MemoryTokenStore, TokenStore};

    fn jwt() -> String {
        let payload = json!({
            "id": 1,
            "name": "Admin",
            "email": "admin@unair.ac.id",
            "role": "admin",
            "exp": chrono::Utc::now().timestamp() + 3600
        });
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    struct Harness {
        client: ApiClient,
        storage: Arc<MemoryTokenStore>,
        navigator: Arc<MemoryNavigator>,
    }

    fn harness(server: &MockServer, token: Option<&str>) -> Harness {
        let storage = Arc::new(token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token));
        let navigator = Arc::new(MemoryNavigator::new());
        let session = SessionStore::new(storage.clone(), navigator.clone());
        session.initialize().unwrap();
        let base = Url::parse(&format!("{}/api", server.uri())).unwrap();
        Harness {
            client: ApiClient::with_base_url(base, session).unwrap(),
            storage,
            navigator,
        }
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let server = MockServer::start().await;
        let token = jwt();
        Mock::given(method("GET"))
            .and(path("/api/admins"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, Some(&token));
        let admins: Vec<Value> = h.client.get("/admins").await.unwrap();
        assert!(admins.is_empty());
    }

    #[tokio::test]
    async fn test_sends_without_token_when_signed_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let h = harness(&server, None);
        let _: Value = h.client.get("ping").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_invalidates_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
            .mount(&server)
            .await;

        let h = harness(&server, Some(&jwt()));
        assert!(h.client.session().is_authenticated());

        let err = h.client.get::<Value>("/users").await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!h.client.session().is_authenticated());
        assert_eq!(h.storage.load().unwrap(), None);
        assert_eq!(
            h.navigator.last(),
            Some(Route::Login(LoginReason::SessionExpired))
        );
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/admins/9"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"message": "Only admins may delete"})),
            )
            .mount(&server)
            .await;

        let h = harness(&server, Some(&jwt()));
        let err = h.client.delete("/admins/9").await.unwrap_err();

        match err {
            ApiError::Api { status, message, .. } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Only admins may delete");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(h.client.session().is_authenticated());
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_without_body_uses_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard/stats"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let h = harness(&server, Some(&jwt()));
        let err = h.client.get::<Value>("/dashboard/stats").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Api { status: 503, ref message, .. } if message == "Service Unavailable"
        ));
    }

    #[test]
    fn test_asset_url() {
        let storage = Arc::new(MemoryTokenStore::new());
        let session = SessionStore::new(storage, Arc::new(MemoryNavigator::new()));
        let client =
            ApiClient::with_base_url(Url::parse("http://localhost:3001/api").unwrap(), session)
                .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:3001/api/");
        assert_eq!(
            client.asset_url("/uploads/avatars/a.png"),
            "http://localhost:3001/uploads/avatars/a.png"
        );
        assert_eq!(
            client.asset_url("https://cdn.example/a.png"),
            "https://cdn.example/a.png"
        );
    }
}
