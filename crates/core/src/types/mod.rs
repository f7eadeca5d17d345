//! Core types for the admin client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod records;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Kwh, Rupiah};
pub use records::*;
pub use status::*;
