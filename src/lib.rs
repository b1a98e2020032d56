//! Diabetic retinopathy screening pipeline.
//!
//! An image is validated and previewed by the [`ImageIngestor`], graded by a
//! [`ClassificationEngine`], and recorded by the [`SessionController`] in a
//! bounded [`SessionHistory`]. Reports are rendered by [`report_service`].
//! Presentation layers talk to the pipeline through [`commands`].

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::{EngineKind, ScreeningConfig};
pub use error::{AppError, ConfigError, EngineError, IngestError, SessionError};
pub use models::classify_types::{ClassificationResult, DisplayTier, DrGrade, RetinalFeatures};
pub use models::image_types::{ImageFile, PreviewHandle, UploadedImage};
pub use models::report_types::{Report, ReportMetadata};
pub use models::session_types::{HistoryEntry, SessionSnapshot, SessionState};
pub use services::classifier::mock::MockEngine;
pub use services::classifier::remote::RemoteEngine;
pub use services::classifier::ClassificationEngine;
pub use services::ingest_service::{ImageIngestor, MAX_UPLOAD_BYTES};
pub use services::report_service;
pub use services::session::controller::SessionController;
pub use services::session::history::{SessionHistory, HISTORY_CAPACITY};
pub use services::session::Session;

/// Install a `tracing` subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
