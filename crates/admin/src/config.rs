//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ASRAMA_API_BASE_URL` - Backend REST base URL (default: `http://localhost:3001/api`)
//! - `ASRAMA_ASSET_HOST` - Prefix for relative avatar/image paths
//!   (default: scheme, host and port of the API URL)
//! - `ASRAMA_STATE_DIR` - Directory holding the persisted session token
//!   (default: `$HOME/.asrama-token`)
//! - `ASRAMA_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate, 0.0 to 1.0 (default: 1.0)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
const DEFAULT_STATE_DIR_NAME: &str = ".asrama-token";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Backend REST base URL. Always ends with `/`.
    pub api_base_url: Url,
    /// Prefix for relative asset paths. Always ends with `/`.
    pub asset_host: Url,
    /// Directory holding the persisted session token.
    pub state_dir: PathBuf,
    /// Timeout applied to every backend request.
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value or no
    /// state directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let api_base_url = parse_http_url(
            "ASRAMA_API_BASE_URL",
            get("ASRAMA_API_BASE_URL").as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )?;
        let asset_host = match get("ASRAMA_ASSET_HOST") {
            Some(host) => parse_http_url("ASRAMA_ASSET_HOST", &host)?,
            None => origin_of(&api_base_url),
        };

        let state_dir = match get("ASRAMA_STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => get("HOME")
                .map(|home| PathBuf::from(home).join(DEFAULT_STATE_DIR_NAME))
                .ok_or_else(|| ConfigError::MissingEnvVar("ASRAMA_STATE_DIR".to_string()))?,
        };

        let timeout_secs = match get("ASRAMA_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "ASRAMA_HTTP_TIMEOUT_SECS".to_string(),
                        format!("expected a positive number of seconds, got {raw:?}"),
                    )
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let sentry_sample_rate = get("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            api_base_url,
            asset_host,
            state_dir,
            http_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
        })
    }
}

/// Parse an http(s) URL and normalize it to end with `/` so that relative
/// joins append rather than replace the last segment.
fn parse_http_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin
}
