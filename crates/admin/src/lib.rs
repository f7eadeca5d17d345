//! Asrama Token admin library.
//!
//! Client side of the dormitory electricity-token admin backend: the
//! session lifecycle, the authenticated HTTP gateway and one service module
//! per backend resource.
//!
//! # Security
//!
//! Tokens are decoded but never verified here. Role checks in this crate
//! only decide what to offer; the backend authorizes every request.
//!
//! # Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use asrama_token_admin::{AdminConfig, ApiClient, FileTokenStore, SessionStore, TracingNavigator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AdminConfig::from_env()?;
//! let session = SessionStore::new(
//!     Arc::new(FileTokenStore::new(&config.state_dir)),
//!     Arc::new(TracingNavigator),
//! );
//! session.initialize()?;
//! let client = ApiClient::new(&config, session)?;
//! let users = client.list_users().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod filters;
pub mod forms;
pub mod gateway;
pub mod navigation;
pub mod services;
pub mod storage;

pub use auth::{AuthError, Claims, Credentials, RouteGuard, SessionState, SessionStore};
pub use config::{AdminConfig, ConfigError};
pub use error::ApiError;
pub use gateway::ApiClient;
pub use navigation::{LoginReason, MemoryNavigator, Navigator, Route, TracingNavigator};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
