//! Process-wide session state.
//!
//! `SessionStore` is the only writer of the session. Every transition that
//! changes the token writes the persisted record in the same call, so the
//! in-memory state and storage never disagree once it returns. Readers
//! (the gateway, the route guard, views) take snapshots or subscribe.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::instrument;
use url::Url;

use super::error::{AuthError, TokenError};
use super::exchange::Credentials;
use super::token::{self, Claims};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::navigation::{LoginReason, Navigator, Route, take_token_param};
use crate::storage::TokenStore;

/// Current authentication state.
///
/// A user exists exactly when a token does; an expired or undecodable token
/// never reaches this type.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated { token: SecretString, user: Claims },
}

impl SessionState {
    /// The bearer token, if signed in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { token, .. } => Some(token),
        }
    }

    /// The decoded identity, if signed in.
    #[must_use]
    pub const fn user(&self) -> Option<&Claims> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user, .. } => Some(user),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// The backend call that trades credentials for a token.
pub trait LoginExchange: Send + Sync {
    /// Exchange `credentials` for a bearer token.
    fn exchange(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<String, AuthError>> + Send;
}

/// Owner of the session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    state: watch::Sender<SessionState>,
    storage: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an empty session backed by `storage`.
    ///
    /// Call [`initialize`](Self::initialize) to restore a persisted session.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: watch::Sender::new(SessionState::Anonymous),
                storage,
                navigator,
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// The current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner.state.borrow().token().cloned()
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn user(&self) -> Option<Claims> {
        self.inner.state.borrow().user().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Whether staff management should be offered. Display gating only.
    #[must_use]
    pub fn can_manage_staff(&self) -> bool {
        self.inner
            .state
            .borrow()
            .user()
            .is_some_and(|user| user.role.can_manage_staff())
    }

    /// Observe every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Restore the session from the persisted token.
    ///
    /// An undecodable or expired token is removed from storage and the
    /// session stays empty. Returns whether a session was restored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the persisted record cannot be read.
    #[instrument(skip(self))]
    pub fn initialize(&self) -> Result<bool, crate::storage::StorageError> {
        let Some(token) = self.inner.storage.load()? else {
            tracing::debug!("No persisted session");
            self.reset();
            return Ok(false);
        };

        match validate(&token) {
            Ok(user) => {
                tracing::info!(admin_id = %user.id, role = %user.role, "Session restored");
                self.commit(token, user);
                Ok(true)
            }
            Err(e) => {
                tracing::info!(error = %e, "Discarding persisted session");
                self.discard();
                Ok(false)
            }
        }
    }

    /// Log in with email and password.
    ///
    /// At most one login should be in flight; the login form enforces this
    /// with its submitting flag.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` if the backend refuses the credentials,
    /// `AuthError::Token` if the issued token is unusable (the session is
    /// left empty), and `AuthError::Http` on transport failures.
    #[instrument(skip(self, exchange, credentials), fields(email = %credentials.email))]
    pub async fn login<E: LoginExchange>(
        &self,
        exchange: &E,
        credentials: &Credentials,
    ) -> Result<Claims, AuthError> {
        let token = exchange.exchange(credentials).await?;
        self.login_from_token(&token)
    }

    /// Start a session from a token issued out of band.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the token is empty, undecodable or
    /// expired; the session and storage are then cleared. Returns
    /// `AuthError::Storage` if the token cannot be persisted, in which case
    /// nothing is committed.
    pub fn login_from_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token = token.trim();
        let user = match validate(token) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting issued token");
                self.discard();
                return Err(e.into());
            }
        };

        self.inner.storage.save(token)?;
        self.commit(token.to_string(), user.clone());
        tracing::info!(admin_id = %user.id, role = %user.role, "Logged in");
        Ok(user)
    }

    /// Consume a token carried on an incoming URL.
    ///
    /// Returns `None` when the URL has no `token` parameter. Otherwise
    /// returns the URL with the parameter stripped, which the caller must
    /// show in place of the original so a reload does not replay it, and
    /// the login outcome.
    pub fn login_from_redirect(&self, url: &Url) -> Option<(Url, Result<Claims, AuthError>)> {
        let (token, scrubbed) = take_token_param(url)?;
        Some((scrubbed, self.login_from_token(&token)))
    }

    /// Sign out and return to the login view. Safe to call when signed out.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        self.discard();
        tracing::info!("Logged out");
        self.inner.navigator.navigate(Route::Login(LoginReason::Required));
    }

    /// Drop the session because the backend rejected its token.
    pub fn invalidate(&self) {
        let was_authenticated = self.is_authenticated();
        self.discard();
        tracing::warn!(was_authenticated, "Session rejected by backend");
        self.inner
            .navigator
            .navigate(Route::Login(LoginReason::SessionExpired));
    }

    /// Invalidate because a request sent with `rejected` got a 401.
    ///
    /// Ignored when the session token has changed since that request was
    /// built, so a late rejection cannot end a newer session. Returns whether
    /// the session was invalidated.
    pub(crate) fn reject_token(&self, rejected: Option<&SecretString>) -> bool {
        let current = self.token();
        let same = match (current.as_ref(), rejected) {
            (Some(current), Some(rejected)) => current.expose_secret() == rejected.expose_secret(),
            (None, None) => true,
            _ => false,
        };
        if !same {
            tracing::info!("Ignoring rejection of a replaced session token");
            return false;
        }
        self.invalidate();
        true
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn commit(&self, token: String, user: Claims) {
        set_sentry_user(user.id.as_i32(), Some(&user.email));
        self.inner.state.send_replace(SessionState::Authenticated {
            token: SecretString::from(token),
            user,
        });
    }

    /// Clear storage and memory. A storage failure is logged; memory is
    /// cleared regardless so the process never keeps using the token.
    fn discard(&self) {
        if let Err(e) = self.inner.storage.clear() {
            tracing::error!(error = %e, "Failed to remove persisted session token");
        }
        self.reset();
    }

    fn reset(&self) {
        let changed = self.inner.state.send_if_modified(|state| {
            let was_authenticated = state.is_authenticated();
            *state = SessionState::Anonymous;
            was_authenticated
        });
        if changed {
            clear_sentry_user();
        }
    }
}

fn validate(token: &str) -> Result<Claims, TokenError> {
    if token.is_empty() {
        return Err(TokenError::Empty);
    }
    let claims = token::decode(token)?;
    if claims.is_expired(Utc::now()) {
        return Err(TokenError::Expired {
            expired_at: claims.expires_at.unwrap_or_default(),
        });
    }
    Ok(claims)
}

/// Expose the token for an `Authorization` header.
pub(crate) fn bearer(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use asrama_token_core::Role;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;

    use super::*;
    use crate::auth::error::LoginRejection;
    use crate::navigation::MemoryNavigator;
    use crate::storage::MemoryTokenStore;

    fn jwt(exp: Option<i64>) -> String {
        let mut payload = json!({
            "id": 7,
            "name": "Admin Asrama",
            "email": "admin@unair.ac.id",
            "role": "admin"
        });
        if let Some(exp) = exp {
            payload["exp"] = json!(exp);
        }
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    fn future() -> Option<i64> {
        Some(Utc::now().timestamp() + 3600)
    }

    fn past() -> Option<i64> {
        Some(Utc::now().timestamp() - 60)
    }

    fn store_with(
        persisted: Option<String>,
    ) -> (SessionStore, Arc<MemoryTokenStore>, Arc<MemoryNavigator>) {
        let storage = Arc::new(persisted.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token));
        let navigator = Arc::new(MemoryNavigator::new());
        let session = SessionStore::new(storage.clone(), navigator.clone());
        (session, storage, navigator)
    }

    struct StubExchange(Result<String, LoginRejection>);

    impl LoginExchange for StubExchange {
        async fn exchange(&self, _credentials: &Credentials) -> Result<String, AuthError> {
            self.0.clone().map_err(AuthError::Rejected)
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("admin@unair.ac.id", "correct").unwrap()
    }

    #[test]
    fn test_initialize_without_persisted_token() {
        let (session, _, _) = store_with(None);
        assert!(!session.initialize().unwrap());
        assert!(session.snapshot().token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_initialize_restores_valid_token() {
        let token = jwt(future());
        let (session, storage, _) = store_with(Some(token.clone()));

        assert!(session.initialize().unwrap());
        assert_eq!(session.token().unwrap().expose_secret(), token);
        assert_eq!(session.user().unwrap().role, Role::Admin);
        assert_eq!(storage.load().unwrap(), Some(token));
    }

    #[test]
    fn test_staff_management_follows_role() {
        let (session, _, _) = store_with(None);
        assert!(!session.can_manage_staff());
        session.login_from_token(&jwt(future())).unwrap();
        assert!(session.can_manage_staff());
    }

    #[test]
    fn test_initialize_keeps_token_without_expiry() {
        let (session, _, _) = store_with(Some(jwt(None)));
        assert!(session.initialize().unwrap());
        assert!(session.user().unwrap().expires_at.is_none());
    }

    #[test]
    fn test_initialize_discards_expired_token() {
        let (session, storage, _) = store_with(Some(jwt(past())));
        assert!(!session.initialize().unwrap());
        assert!(!session.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_initialize_discards_garbage_token() {
        let (session, storage, _) = store_with(Some("not-a-token".to_string()));
        assert!(!session.initialize().unwrap());
        assert!(!session.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_persists_exact_token() {
        let token = jwt(future());
        let (session, storage, _) = store_with(None);

        let user = session
            .login(&StubExchange(Ok(token.clone())), &credentials())
            .await
            .unwrap();

        assert_eq!(user.id.as_i32(), 7);
        assert_eq!(storage.load().unwrap(), Some(token));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_rejection_leaves_session_empty() {
        let (session, storage, _) = store_with(None);
        let rejection = LoginRejection {
            status: 401,
            code: None,
            message: Some("Invalid credentials".to_string()),
        };

        let err = session
            .login(&StubExchange(Err(rejection)), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Rejected(_)));
        assert!(!err.is_account_inactive());
        assert!(!session.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_with_undecodable_token_commits_nothing() {
        let (session, storage, _) = store_with(Some(jwt(future())));
        session.initialize().unwrap();

        let err = session
            .login(&StubExchange(Ok("garbage".to_string())), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Token(TokenError::Decode(_))));
        assert!(!session.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_login_from_token_rejects_expired_and_empty() {
        let (session, _, _) = store_with(None);
        assert!(matches!(
            session.login_from_token(&jwt(past())),
            Err(AuthError::Token(TokenError::Expired { .. }))
        ));
        assert!(matches!(
            session.login_from_token("  "),
            Err(AuthError::Token(TokenError::Empty))
        ));
    }

    #[test]
    fn test_login_from_redirect_scrubs_url() {
        let (session, storage, _) = store_with(None);
        let token = jwt(future());
        let url = Url::parse(&format!("https://admin.example.test/login?token={token}")).unwrap();

        let (scrubbed, result) = session.login_from_redirect(&url).unwrap();

        assert_eq!(scrubbed.as_str(), "https://admin.example.test/login");
        assert!(result.is_ok());
        assert_eq!(storage.load().unwrap(), Some(token));
    }

    #[test]
    fn test_login_from_redirect_without_token() {
        let (session, _, _) = store_with(None);
        let url = Url::parse("https://admin.example.test/login").unwrap();
        assert!(session.login_from_redirect(&url).is_none());
    }

    #[test]
    fn test_rejection_of_replaced_token_is_ignored() {
        let (session, storage, navigator) = store_with(None);
        session.login_from_token(&jwt(future())).unwrap();
        let old = session.token();

        let newer = jwt(Some(Utc::now().timestamp() + 7200));
        session.login_from_token(&newer).unwrap();

        assert!(!session.reject_token(old.as_ref()));
        assert!(session.is_authenticated());
        assert_eq!(storage.load().unwrap(), Some(newer));
        assert!(navigator.history().is_empty());

        let current = session.token();
        assert!(session.reject_token(current.as_ref()));
        assert!(!session.is_authenticated());
        assert_eq!(
            navigator.last(),
            Some(Route::Login(LoginReason::SessionExpired))
        );
    }

    #[test]
    fn test_logout_is_idempotent() {
        let (session, storage, navigator) = store_with(Some(jwt(future())));
        session.initialize().unwrap();

        session.logout();
        session.logout();

        assert!(!session.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
        assert_eq!(
            navigator.history(),
            vec![
                Route::Login(LoginReason::Required),
                Route::Login(LoginReason::Required)
            ]
        );
    }

    #[test]
    fn test_invalidate_redirects_with_expired_reason() {
        let (session, storage, navigator) = store_with(Some(jwt(future())));
        session.initialize().unwrap();

        session.invalidate();

        assert!(!session.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
        assert_eq!(navigator.last(), Some(Route::Login(LoginReason::SessionExpired)));
    }

    #[tokio::test]
    async fn test_subscribers_see_logout() {
        let (session, _, _) = store_with(Some(jwt(future())));
        session.initialize().unwrap();
        let mut rx = session.subscribe();

        session.logout();

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[test]
    fn test_clearing_empty_session_does_not_notify() {
        let (session, _, _) = store_with(None);
        let rx = session.subscribe();
        session.logout();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_bearer_header() {
        let token = SecretString::from("abc.def.ghi");
        assert_eq!(bearer(&token), "Bearer abc.def.ghi");
    }
}
