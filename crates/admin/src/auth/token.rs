//! Session token codec.
//!
//! Reads the claims out of a JWT-shaped bearer token. The signature is
//! never checked: the claims are display hints for the client, and the
//! backend re-validates the token on every request. Do not base any
//! access decision on these claims alone.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use asrama_token_core::{AdminId, Role};

use super::error::DecodeError;

/// Identity decoded from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    /// Admin account ID (`id`, falling back to `sub`).
    pub id: AdminId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Staff role.
    pub role: Role,
    /// Avatar path or URL.
    pub avatar: Option<String>,
    /// `iat`, seconds since the epoch.
    pub issued_at: Option<i64>,
    /// `exp`, seconds since the epoch. `None` means the token never expires.
    pub expires_at: Option<i64>,
}

/// Wire shape of the payload before the subject is normalized.
#[derive(Deserialize)]
struct RawClaims {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    sub: Option<Value>,
    name: String,
    email: String,
    role: Role,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

impl Claims {
    /// Whether the token expired strictly before `now`.
    ///
    /// Tokens without an `exp` claim never expire.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| {
            i128::from(exp) * 1000 < i128::from(now.timestamp_millis())
        })
    }

    /// Expiry as a timestamp, if present and representable.
    #[must_use]
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Issue time as a timestamp, if present and representable.
    #[must_use]
    pub fn issued(&self) -> Option<DateTime<Utc>> {
        self.issued_at.and_then(|iat| DateTime::from_timestamp(iat, 0))
    }
}

/// Decode the claims carried in `token`.
///
/// Purely structural: the token must be three dot-separated segments with a
/// base64url JSON payload. No signature verification is performed.
///
/// # Errors
///
/// Returns `DecodeError` if the token is not structurally a JWT or its
/// payload does not hold the expected claims.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    let [header, payload, _signature] = segments.as_slice() else {
        return Err(DecodeError::Segments(segments.len()));
    };
    if header.is_empty() {
        return Err(DecodeError::EmptySegment("header"));
    }
    if payload.is_empty() {
        return Err(DecodeError::EmptySegment("payload"));
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let raw: RawClaims = serde_json::from_slice(&bytes)?;

    let subject = raw
        .id
        .or(raw.sub)
        .ok_or(DecodeError::MissingClaim("id"))?;

    Ok(Claims {
        id: parse_subject(&subject)?,
        name: raw.name,
        email: raw.email,
        role: raw.role,
        avatar: raw.avatar.filter(|avatar| !avatar.is_empty()),
        issued_at: raw.iat,
        expires_at: raw.exp,
    })
}

/// Whether `claims` expired strictly before `now`.
#[must_use]
pub fn is_expired(claims: &Claims, now: DateTime<Utc>) -> bool {
    claims.is_expired(now)
}

fn parse_subject(value: &Value) -> Result<AdminId, DecodeError> {
    let id = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.and_then(|id| i32::try_from(id).ok())
        .map(AdminId::new)
        .ok_or(DecodeError::InvalidSubject)
}
