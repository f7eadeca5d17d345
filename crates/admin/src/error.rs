//! Unified error handling for backend calls.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::gateway::ApiClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the session token. The session has already been
    /// cleared and the user redirected to login when this is returned.
    #[error("Unauthorized: session is no longer valid")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response, or the body was unreadable.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A local file could not be read for upload.
    #[error("Failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status of a backend refusal, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Http(_) | Self::Url(_) | Self::File { .. } => None,
        }
    }

    /// Whether the failure is on the backend or transport side.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status >= 500,
            Self::Http(_) => true,
            Self::Unauthorized | Self::Url(_) | Self::File { .. } => false,
        }
    }

    /// Text safe to show staff. Internal details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            Self::Api { status: 404, .. } => "The requested data was not found.".to_string(),
            Self::Api { status, message, .. } if (400..500).contains(status) => message.clone(),
            Self::Api { .. } | Self::Http(_) => {
                "The server could not complete the request. Please try again later.".to_string()
            }
            Self::Url(_) => "The backend address is misconfigured.".to_string(),
            Self::File { path, .. } => format!("Could not read {}.", path.display()),
        }
    }

    /// Log the error and, for server-side failures, report it to Sentry.
    pub(crate) fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Backend request failed"
            );
        } else {
            tracing::debug!(error = %self, "Backend request refused");
        }
    }
}

/// Error body shape used by the backend.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse a response body, tolerating non-JSON text.
    pub(crate) fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| Self {
            message: (!text.trim().is_empty()).then(|| text.trim().to_string()),
            ..Self::default()
        })
    }

    /// The most specific human-readable message available.
    pub(crate) fn message(&self) -> Option<String> {
        self.message.clone().or_else(|| self.error.clone())
    }
}

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> ApiError {
        ApiError::Api {
            status,
            code: None,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            api(422, "kwh must be positive").to_string(),
            "API error (HTTP 422): kwh must be positive"
        );
        assert_eq!(
            ApiError::Unauthorized.to_string(),
            "Unauthorized: session is no longer valid"
        );
    }

    #[test]
    fn test_user_message_hides_server_details() {
        let msg = api(500, "relation \"admins\" does not exist").user_message();
        assert!(!msg.contains("relation"));
        assert_eq!(api(409, "Email already in use").user_message(), "Email already in use");
        assert_eq!(
            api(404, "no row").user_message(),
            "The requested data was not found."
        );
    }

    #[test]
    fn test_server_error_classification() {
        assert!(api(502, "bad gateway").is_server_error());
        assert!(!api(400, "bad request").is_server_error());
        assert!(!ApiError::Unauthorized.is_server_error());
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
    }

    #[test]
    fn test_error_body_parsing() {
        let body = ErrorBody::parse(r#"{"error_code":"account_inactive","message":"Akun nonaktif"}"#);
        assert_eq!(body.error_code.as_deref(), Some("account_inactive"));
        assert_eq!(body.message().as_deref(), Some("Akun nonaktif"));

        let body = ErrorBody::parse(r#"{"error":"Not allowed"}"#);
        assert_eq!(body.message().as_deref(), Some("Not allowed"));

        let body = ErrorBody::parse("Internal Server Error");
        assert_eq!(body.message().as_deref(), Some("Internal Server Error"));
        assert!(body.error_code.is_none());

        assert!(ErrorBody::parse("").message().is_none());
    }
}
