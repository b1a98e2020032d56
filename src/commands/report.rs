use crate::config::ScreeningConfig;
use crate::error::{AppError, SessionError};
use crate::models::report_types::Report;
use crate::services::report_service;
use crate::services::session::controller::SessionController;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct ExportedReport {
    pub path: String,
    pub patient_id: String,
}

/// Render the report for the current result.
pub async fn render_report(
    controller: &SessionController,
    config: &ScreeningConfig,
) -> Result<Report, AppError> {
    let snapshot = controller.snapshot().await;
    let result = snapshot.result.ok_or(SessionError::NoResult)?;
    let meta = config.report_metadata(snapshot.image.map(|img| img.name));
    Ok(report_service::render(&result, &meta))
}

/// Render the current report and write it into `output_dir`.
pub async fn export_report(
    controller: &SessionController,
    config: &ScreeningConfig,
    output_dir: &str,
) -> Result<ExportedReport, AppError> {
    let report = render_report(controller, config).await?;

    tokio::fs::create_dir_all(output_dir).await.map_err(|e| AppError {
        kind: "io",
        message: format!("Failed to create directory {}: {}", output_dir, e),
    })?;

    let dest: PathBuf = Path::new(output_dir).join(&report.file_name);
    tokio::fs::write(&dest, report.text.as_bytes()).await.map_err(|e| AppError {
        kind: "io",
        message: format!("Failed to write report {}: {}", dest.display(), e),
    })?;

    tracing::info!(path = %dest.display(), "report exported");

    Ok(ExportedReport {
        path: dest.to_string_lossy().to_string(),
        patient_id: report.patient_id,
    })
}

pub async fn share_summary(controller: &SessionController) -> Result<String, AppError> {
    let result = controller.current_result().await.ok_or(SessionError::NoResult)?;
    Ok(report_service::share_summary(&result))
}
