use axum::extract::Multipart;

use crate::error::ApiError;
use crate::models::ImagePanel;
use crate::services::{image_pipeline, PipelineError};

/// Multipart field carrying the X-ray file
pub const UPLOAD_FIELD: &str = "xray";

/// A received multipart upload: the file plus any plain fields
#[derive(Debug, Default)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub fields: Vec<(String, String)>,
}

impl Upload {
    /// Drain a multipart body, keeping the `xray` file and text fields
    pub async fn read(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut upload = Upload::default();
        let mut found = false;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == UPLOAD_FIELD {
                upload.file_name = field.file_name().unwrap_or("upload").to_string();
                upload.content_type = field.content_type().map(str::to_string);
                upload.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?
                    .to_vec();
                found = true;
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                upload.fields.push((name, value));
            }
        }

        if !found {
            return Err(ApiError::BadRequest(format!(
                "missing file field `{UPLOAD_FIELD}`"
            )));
        }

        tracing::debug!(
            file = %upload.file_name,
            content_type = ?upload.content_type,
            bytes = upload.bytes.len(),
            "Received upload"
        );
        Ok(upload)
    }

    /// Check the type and decode the image, refusing anything wider or
    /// taller than `max_dimension`
    pub async fn decode(self, max_dimension: u32) -> Result<ImagePanel, PipelineError> {
        image_pipeline::check_upload(&self.file_name, self.content_type.as_deref())?;
        image_pipeline::load(self.bytes, max_dimension).await
    }
}
