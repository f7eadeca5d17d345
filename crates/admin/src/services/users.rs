//! Dormitory residents.

use tracing::instrument;

use asrama_token_core::User;

use crate::error::ApiError;
use crate::gateway::ApiClient;

impl ApiClient {
    /// List all residents.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("users").await
    }
}
