//! Admin and operator account management.

use tracing::instrument;

use asrama_token_core::{Admin, AdminId, AdminPayload};

use crate::error::ApiError;
use crate::gateway::ApiClient;

impl ApiClient {
    /// List all admin and operator accounts.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list_admins(&self) -> Result<Vec<Admin>, ApiError> {
        self.get("admins").await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, payload), fields(email = %payload.email, role = %payload.role))]
    pub async fn create_admin(&self, payload: &AdminPayload) -> Result<Admin, ApiError> {
        let admin: Admin = self.post("admins", payload).await?;
        tracing::info!(admin_id = %admin.id, "Admin created");
        Ok(admin)
    }

    /// Replace an account's details. The password is only changed when the
    /// payload carries one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, payload), fields(admin_id = %id))]
    pub async fn update_admin(&self, id: AdminId, payload: &AdminPayload) -> Result<Admin, ApiError> {
        self.put(&format!("admins/{id}"), payload).await
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(admin_id = %id))]
    pub async fn delete_admin(&self, id: AdminId) -> Result<(), ApiError> {
        self.delete(&format!("admins/{id}")).await?;
        tracing::info!(admin_id = %id, "Admin deleted");
        Ok(())
    }

    /// Flip an account between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(admin_id = %id))]
    pub async fn toggle_admin_status(&self, id: AdminId) -> Result<Admin, ApiError> {
        self.patch(&format!("admins/{id}/status")).await
    }
}
