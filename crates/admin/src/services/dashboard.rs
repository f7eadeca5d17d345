//! Dashboard statistics.

use tracing::instrument;

use asrama_token_core::DashboardStats;

use crate::error::ApiError;
use crate::gateway::ApiClient;

impl ApiClient {
    /// Fetch pre-aggregated totals and series.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("dashboard/stats").await
    }
}
