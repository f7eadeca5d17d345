//! Purchasable token denominations.

use tracing::instrument;

use asrama_token_core::{TokenPrice, TokenPriceId, TokenPricePayload};

use crate::error::ApiError;
use crate::gateway::ApiClient;

impl ApiClient {
    /// List all denominations, active or not.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list_token_prices(&self) -> Result<Vec<TokenPrice>, ApiError> {
        self.get("token-prices").await
    }

    /// Add a denomination.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(amount = %payload.amount, kwh = %payload.kwh))]
    pub async fn create_token_price(
        &self,
        payload: &TokenPricePayload,
    ) -> Result<TokenPrice, ApiError> {
        self.post("token-prices", payload).await
    }

    /// Change a denomination's amount and kWh.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(token_price_id = %id))]
    pub async fn update_token_price(
        &self,
        id: &TokenPriceId,
        payload: &TokenPricePayload,
    ) -> Result<TokenPrice, ApiError> {
        self.put(&format!("token-prices/{id}"), payload).await
    }

    /// Remove a denomination.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(token_price_id = %id))]
    pub async fn delete_token_price(&self, id: &TokenPriceId) -> Result<(), ApiError> {
        self.delete(&format!("token-prices/{id}")).await
    }

    /// Offer or withdraw a denomination.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(token_price_id = %id))]
    pub async fn toggle_token_price(&self, id: &TokenPriceId) -> Result<TokenPrice, ApiError> {
        self.patch(&format!("token-prices/{id}/status")).await
    }
}
