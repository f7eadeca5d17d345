//! Views, redirects and the login redirect carrier.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use url::Url;

/// Query parameter that carries a pre-issued token on an incoming URL.
pub const TOKEN_PARAM: &str = "token";

/// Why the login view is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginReason {
    /// No session, or the user signed out.
    #[default]
    Required,
    /// The backend rejected the session token.
    SessionExpired,
}

/// A navigable view of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login(LoginReason),
    Dashboard,
    Users,
    Tokens,
    Purchases,
    Admins,
    Settings,
}

impl Route {
    /// Resolve a path (optionally with a query string) to a route.
    ///
    /// `/` and unknown paths land on the dashboard.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "/login" => {
                let expired = query
                    .split('&')
                    .any(|pair| pair == "session=expired");
                Self::Login(if expired {
                    LoginReason::SessionExpired
                } else {
                    LoginReason::Required
                })
            }
            "/users" => Self::Users,
            "/tokens" => Self::Tokens,
            "/purchases" => Self::Purchases,
            "/admins" => Self::Admins,
            "/settings" => Self::Settings,
            _ => Self::Dashboard,
        }
    }

    /// Path for this route, including the login reason if any.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Login(LoginReason::Required) => "/login",
            Self::Login(LoginReason::SessionExpired) => "/login?session=expired",
            Self::Dashboard => "/dashboard",
            Self::Users => "/users",
            Self::Tokens => "/tokens",
            Self::Purchases => "/purchases",
            Self::Admins => "/admins",
            Self::Settings => "/settings",
        }
    }

    /// Whether the route requires a session.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        !matches!(self, Self::Login(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs forced navigation on behalf of the session store.
pub trait Navigator: Send + Sync {
    /// Move the user to `route`.
    fn navigate(&self, route: Route);
}

/// Navigator for headless processes: records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(route = %route, "Navigating");
    }
}

/// Navigator that keeps every redirect, for assertions.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every route navigated to, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent route, if any.
    #[must_use]
    pub fn last(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, route: Route) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}

/// Take the `token` query parameter out of `url`.
///
/// Returns the token and the URL with the parameter stripped; all other
/// query parameters are kept in order. Returns `None` when the URL carries
/// no non-empty token.
#[must_use]
pub fn take_token_param(url: &Url) -> Option<(String, Url)> {
    let mut token = None;
    let mut kept = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == TOKEN_PARAM {
            if token.is_none() && !value.is_empty() {
                token = Some(value.into_owned());
            }
        } else {
            kept.push((key.into_owned(), value.into_owned()));
        }
    }
    let token = token?;

    let mut scrubbed = url.clone();
    if kept.is_empty() {
        scrubbed.set_query(None);
    } else {
        scrubbed.query_pairs_mut().clear().extend_pairs(kept);
    }
    Some((token, scrubbed))
}
