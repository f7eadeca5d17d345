//! Session and login error types.

use thiserror::Error;

use crate::storage::StorageError;

/// A token that could not be parsed into claims.
///
/// Never shown to staff as a distinct message: an undecodable token is
/// indistinguishable from having no session at all.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The token is not `header.payload.signature`.
    #[error("token must have three dot-separated segments, found {0}")]
    Segments(usize),

    /// The header or payload segment is empty.
    #[error("token has an empty {0} segment")]
    EmptySegment(&'static str),

    /// The payload is not base64url.
    #[error("token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload is not a JSON claim set.
    #[error("token payload is not valid claims JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required claim is absent.
    #[error("token is missing the {0} claim")]
    MissingClaim(&'static str),

    /// The subject is neither a number nor a numeric string.
    #[error("token subject is not a numeric id")]
    InvalidSubject,
}

/// A token that cannot back a session.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No token was supplied.
    #[error("token is empty")]
    Empty,

    /// The token could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The token's expiry is in the past.
    #[error("token expired at unix time {expired_at}")]
    Expired {
        /// The `exp` claim, in seconds since the epoch.
        expired_at: i64,
    },
}

/// Why the backend refused a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRejection {
    /// HTTP status of the refusal.
    pub status: u16,
    /// Machine-readable `error_code`, when the backend sends one.
    pub code: Option<String>,
    /// Human-readable `message`, when the backend sends one.
    pub message: Option<String>,
}

impl LoginRejection {
    /// Backend code for a disabled account.
    pub const ACCOUNT_INACTIVE: &'static str = "account_inactive";

    /// Whether the backend reported the account as disabled.
    #[must_use]
    pub fn is_account_inactive(&self) -> bool {
        self.code.as_deref() == Some(Self::ACCOUNT_INACTIVE)
    }
}

impl std::fmt::Display for LoginRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Errors that can occur while establishing a session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend refused the credentials.
    #[error("login rejected: {0}")]
    Rejected(LoginRejection),

    /// The backend issued a token the client cannot use.
    #[error("issued token is unusable: {0}")]
    Token(#[from] TokenError),

    /// The login request never produced a usable response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The login URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The token could not be persisted; nothing was committed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Whether the backend reported the account as disabled.
    #[must_use]
    pub fn is_account_inactive(&self) -> bool {
        matches!(self, Self::Rejected(rejection) if rejection.is_account_inactive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(code: Option<&str>) -> LoginRejection {
        LoginRejection {
            status: 401,
            code: code.map(str::to_string),
            message: None,
        }
    }

    #[test]
    fn test_account_inactive_is_detected_from_code() {
        assert!(AuthError::Rejected(rejection(Some("account_inactive"))).is_account_inactive());
        assert!(!AuthError::Rejected(rejection(Some("invalid_password"))).is_account_inactive());
        assert!(!AuthError::Rejected(rejection(None)).is_account_inactive());
        assert!(!AuthError::Token(TokenError::Empty).is_account_inactive());
    }

    #[test]
    fn test_rejection_display() {
        let rejection = LoginRejection {
            status: 403,
            code: Some("account_inactive".to_string()),
            message: Some("Account disabled".to_string()),
        };
        assert_eq!(
            rejection.to_string(),
            "HTTP 403 [account_inactive]: Account disabled"
        );
        assert_eq!(self::rejection(None).to_string(), "HTTP 401");
    }

    #[test]
    fn test_expired_display() {
        let err = TokenError::Expired {
            expired_at: 1_700_000_000,
        };
        assert_eq!(err.to_string(), "token expired at unix time 1700000000");
    }
}
