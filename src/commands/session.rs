use crate::error::AppError;
use crate::models::classify_types::ClassificationResult;
use crate::models::image_types::{ImageFile, UploadedImage};
use crate::models::session_types::{HistoryEntry, SessionSnapshot};
use crate::services::ingest_service;
use crate::services::session::controller::SessionController;
use std::path::Path;

/// Load an image from disk and make it the current image.
///
/// The size limit is checked from file metadata before any bytes are read.
pub async fn upload_image(controller: &SessionController, path: &str) -> Result<UploadedImage, AppError> {
    let file_path = Path::new(path);
    let mime_type = ingest_service::mime_for_path(file_path);

    let metadata = tokio::fs::metadata(file_path).await.map_err(|e| AppError {
        kind: "io",
        message: format!("Cannot read {}: {}", path, e),
    })?;
    ingest_service::check_constraints(mime_type, metadata.len())?;

    let bytes = tokio::fs::read(file_path).await.map_err(|e| AppError {
        kind: "io",
        message: format!("Failed to read image {}: {}", path, e),
    })?;

    let name = file_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(controller.upload(ImageFile::new(name, mime_type, bytes)).await?)
}

/// Make in-memory bytes the current image, e.g. from a drag-and-drop payload.
pub async fn upload_bytes(
    controller: &SessionController,
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
) -> Result<UploadedImage, AppError> {
    Ok(controller.upload(ImageFile::new(name, mime_type, bytes)).await?)
}

pub async fn analyze_image(controller: &SessionController) -> Result<ClassificationResult, AppError> {
    Ok(controller.analyze().await?)
}

pub async fn cancel_analysis(controller: &SessionController) -> Result<bool, AppError> {
    Ok(controller.cancel_analysis().await)
}

pub async fn clear_session(controller: &SessionController) -> Result<(), AppError> {
    controller.clear().await;
    Ok(())
}

pub async fn get_session(controller: &SessionController) -> Result<SessionSnapshot, AppError> {
    Ok(controller.snapshot().await)
}

pub async fn get_history(controller: &SessionController) -> Result<Vec<HistoryEntry>, AppError> {
    Ok(controller.history().await)
}
