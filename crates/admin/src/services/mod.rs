//! Backend endpoints, one module per resource.
//!
//! # Services
//!
//! - `admins` - Admin and operator accounts
//! - `dashboard` - Aggregated statistics
//! - `master_data` - Per-kWh rate and admin fee
//! - `purchases` - Token purchase history
//! - `token_prices` - Purchasable token denominations
//! - `uploads` - Image upload
//! - `users` - Dormitory residents
//!
//! Every call goes through the [`ApiClient`](crate::gateway::ApiClient)
//! gateway, so a rejected session is handled before any of these return.

pub mod admins;
pub mod dashboard;
pub mod master_data;
pub mod purchases;
pub mod token_prices;
pub mod uploads;
pub mod users;

use serde::Deserialize;

/// `{ "data": ... }` envelope used by some endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}
