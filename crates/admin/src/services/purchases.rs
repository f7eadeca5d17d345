//! Token purchase history.

use tracing::instrument;

use asrama_token_core::Purchase;

use crate::error::ApiError;
use crate::gateway::ApiClient;

impl ApiClient {
    /// List all purchases, newest first as returned by the backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list_purchases(&self) -> Result<Vec<Purchase>, ApiError> {
        self.get("purchases").await
    }
}
