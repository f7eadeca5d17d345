//! Asrama Token Core - Shared types library.
//!
//! This crate provides common types used across all components of the
//! dormitory electricity-token admin client:
//! - `admin` - Session, gateway and endpoint services
//! - `cli` - Command-line surface for staff
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Every record here is owned by the backend; the client only reflects the
//! last successful fetch.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, money, roles and statuses,
//!   plus the backend records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
