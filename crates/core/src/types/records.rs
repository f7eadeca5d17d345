//! Backend-owned records.
//!
//! Field names follow the backend's JSON: camelCase for most records,
//! snake_case for master data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{AdminId, MasterDataId, PurchaseId, TokenPriceId, UserId};
use super::money::{Kwh, Rupiah};
use super::status::{AccountStatus, PurchaseStatus, Role};

/// A dormitory resident who buys electricity tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Student number.
    pub nim: String,
    /// Dormitory building.
    pub asrama: String,
    pub room: String,
    pub balance: Rupiah,
    pub created_at: DateTime<Utc>,
    pub status: AccountStatus,
    pub total_purchases: u32,
}

/// An admin or operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub email: String,
    /// Avatar path or URL as stored by the backend.
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    pub status: AccountStatus,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or updating an admin/operator account.
///
/// `password` is omitted on update when unchanged.
#[derive(Clone, Serialize)]
pub struct AdminPayload {
    pub name: String,
    pub email: Email,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl std::fmt::Debug for AdminPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminPayload")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("avatar", &self.avatar)
            .finish()
    }
}

/// A purchasable token denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub id: TokenPriceId,
    pub amount: Rupiah,
    pub kwh: Kwh,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Body for creating or updating a token price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenPricePayload {
    pub amount: Rupiah,
    pub kwh: Kwh,
}

/// A completed, pending or failed token purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub user_name: String,
    pub amount: Rupiah,
    pub kwh: Kwh,
    pub date: DateTime<Utc>,
    pub status: PurchaseStatus,
    /// The 20-digit meter token handed to the resident.
    pub token_code: String,
}

/// One point in a dashboard series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Month or day label, e.g. `Jan` or `Sen`.
    #[serde(alias = "month", alias = "day")]
    pub label: String,
    pub purchases: u32,
    pub revenue: Rupiah,
}

/// Pre-aggregated statistics for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u32,
    pub total_purchases: u32,
    pub total_revenue: Rupiah,
    pub total_kwh: Kwh,
    #[serde(default)]
    pub monthly_data: Vec<SeriesPoint>,
    #[serde(default)]
    pub daily_data: Vec<SeriesPoint>,
}

/// The per-kWh rate and admin fee applied to purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterData {
    pub id: MasterDataId,
    pub harga_per_kwh: Rupiah,
    #[serde(with = "rust_decimal::serde::float")]
    pub biaya_admin_persen: Decimal,
}

/// Body for creating or updating master data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MasterDataPayload {
    pub harga_per_kwh: Rupiah,
    #[serde(with = "rust_decimal::serde::float")]
    pub biaya_admin_persen: Decimal,
}

/// Result of an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    /// Path or URL of the stored image.
    pub url: String,
    pub filename: String,
}
