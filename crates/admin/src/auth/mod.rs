//! Session lifecycle: token codec, session store, login exchange and route
//! guard.
//!
//! # Trust boundary
//!
//! Decoded claims are display hints. The client never verifies token
//! signatures; the backend re-checks authorization on every request. Do not
//! add access control that relies on the client alone.

mod error;
mod exchange;
mod guard;
pub(crate) mod session;
pub mod token;

pub use error::{AuthError, DecodeError, LoginRejection, TokenError};
pub use exchange::Credentials;
pub use guard::RouteGuard;
pub use session::{LoginExchange, SessionState, SessionStore};
pub use token::Claims;
