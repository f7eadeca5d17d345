//! Image upload for avatars.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::instrument;

use asrama_token_core::UploadedImage;

use crate::error::ApiError;
use crate::gateway::ApiClient;

/// Multipart field the backend reads the file from.
const IMAGE_FIELD: &str = "image";

/// Content type guessed from the file extension.
fn content_type(file_name: &str) -> mime_guess::Mime {
    mime_guess::from_path(file_name).first_or_octet_stream()
}

impl ApiClient {
    /// Upload image bytes under `file_name`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ApiError> {
        let mime = content_type(file_name);
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())?;
        let form = Form::new().part(IMAGE_FIELD, part);
        let uploaded: UploadedImage = self.post_multipart("files/image", form).await?;
        tracing::info!(url = %uploaded.url, "Image uploaded");
        Ok(uploaded)
    }

    /// Read a local file and upload it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::File` if the file cannot be read, otherwise as
    /// [`upload_image`](Self::upload_image).
    pub async fn upload_image_file(&self, path: &Path) -> Result<UploadedImage, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
        self.upload_image(&file_name, bytes).await
    }
}
