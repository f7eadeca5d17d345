//! Route protection over the session state.
//!
//! The guard only inspects the already-loaded session. It never calls the
//! backend; the backend remains the authority on every request.

use tokio::sync::watch;

use super::session::{SessionState, SessionStore};
use crate::navigation::{LoginReason, Route};

/// Decides whether protected views may render.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    state: watch::Receiver<SessionState>,
}

impl RouteGuard {
    /// A guard that tracks `session`.
    #[must_use]
    pub fn new(session: &SessionStore) -> Self {
        Self {
            state: session.subscribe(),
        }
    }

    /// Whether a session token is present.
    #[must_use]
    pub fn can_enter(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Where a request for `path` should land.
    ///
    /// Protected routes need a session, otherwise login. The login view
    /// with a session goes straight to the dashboard.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Route {
        self.resolve_route(Route::parse(path))
    }

    /// Same as [`resolve`](Self::resolve) for an already-parsed route.
    #[must_use]
    pub fn resolve_route(&self, route: Route) -> Route {
        match (route, self.can_enter()) {
            (Route::Login(_), true) => Route::Dashboard,
            (route, true) => route,
            (Route::Login(reason), false) => Route::Login(reason),
            (_, false) => Route::Login(LoginReason::Required),
        }
    }

    /// Wait for the next session change and return the new verdict.
    ///
    /// Returns `None` once the session store is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().is_authenticated())
    }

    /// Evict a rendered view if the session ended since it was entered.
    ///
    /// Returns the redirect to follow, if any.
    #[must_use]
    pub fn evict(&mut self, current: Route) -> Option<Route> {
        let allowed = self.state.borrow_and_update().is_authenticated();
        (current.is_protected() && !allowed).then_some(Route::Login(LoginReason::Required))
    }
}
