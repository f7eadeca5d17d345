//! Per-kWh rate and admin fee.
//!
//! The backend keeps a list of records; the one with the highest id is
//! current.

use tracing::instrument;

use asrama_token_core::{MasterData, MasterDataId, MasterDataPayload};

use super::DataEnvelope;
use crate::error::ApiError;
use crate::gateway::ApiClient;

const MASTER_DATA_PATH: &str = "master-data";

/// The current record out of everything the backend returned.
#[must_use]
pub fn current(records: &[MasterData]) -> Option<MasterData> {
    records.iter().max_by_key(|record| record.id).copied()
}

impl ApiClient {
    /// Fetch the current master data, if any has been saved.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn current_master_data(&self) -> Result<Option<MasterData>, ApiError> {
        let envelope: DataEnvelope<Vec<MasterData>> = self.get(MASTER_DATA_PATH).await?;
        Ok(current(&envelope.data))
    }

    /// Save master data: update `existing` when given, otherwise create.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn save_master_data(
        &self,
        existing: Option<MasterDataId>,
        payload: &MasterDataPayload,
    ) -> Result<MasterData, ApiError> {
        let envelope: DataEnvelope<MasterData> = match existing {
            Some(id) => self.put(&format!("{MASTER_DATA_PATH}/{id}"), payload).await?,
            None => self.post(MASTER_DATA_PATH, payload).await?,
        };
        tracing::info!(master_data_id = %envelope.data.id, "Master data saved");
        Ok(envelope.data)
    }

    /// Delete a master data record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(master_data_id = %id))]
    pub async fn delete_master_data(&self, id: MasterDataId) -> Result<(), ApiError> {
        self.delete(&format!("{MASTER_DATA_PATH}/{id}")).await
    }
}
