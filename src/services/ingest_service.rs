use crate::error::IngestError;
use crate::models::image_types::{ImageFile, PreviewHandle, UploadedImage};
use crate::services::preview_service;
use std::path::Path;

/// Largest accepted upload: 5 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
];

/// MIME type implied by a file extension, `application/octet-stream` when unknown.
pub fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let lower = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS
                .iter()
                .find(|(e, _)| *e == lower)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or("application/octet-stream")
}

/// Accept or reject a file from its declared type and size alone.
///
/// The type is checked first, so a file violating both rules reports `InvalidType`.
pub fn check_constraints(mime_type: &str, size_bytes: u64) -> Result<(), IngestError> {
    if !mime_type.starts_with("image/") {
        return Err(IngestError::InvalidType {
            mime_type: mime_type.to_string(),
        });
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(IngestError::TooLarge {
            size_bytes,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Validates files and turns them into previewable images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageIngestor;

impl ImageIngestor {
    pub fn new() -> Self {
        Self
    }

    pub async fn validate(&self, file: ImageFile) -> Result<UploadedImage, IngestError> {
        let size_bytes = file.size_bytes();
        if let Err(e) = check_constraints(&file.mime_type, size_bytes) {
            tracing::warn!(name = %file.name, mime_type = %file.mime_type, size_bytes, error = %e, "image rejected");
            return Err(e);
        }

        let ImageFile {
            name,
            mime_type,
            bytes,
        } = file;

        // Decoding is CPU bound; keep it off the async workers.
        let preview = {
            let (task_mime, task_bytes) = (mime_type.clone(), bytes.clone());
            match tokio::task::spawn_blocking(move || {
                preview_service::build_preview(&task_mime, &task_bytes)
            })
            .await
            {
                Ok(preview) => preview,
                Err(e) => {
                    tracing::warn!(error = %e, "preview task failed, using plain data URI");
                    PreviewHandle {
                        data_uri: preview_service::data_uri(&mime_type, &bytes),
                        thumbnail: None,
                        width: None,
                        height: None,
                    }
                }
            }
        };

        tracing::debug!(name = %name, mime_type = %mime_type, size_bytes, "image accepted");

        Ok(UploadedImage {
            name,
            mime_type,
            size_bytes,
            bytes,
            preview,
        })
    }
}
