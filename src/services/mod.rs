pub mod classifier;
pub mod ingest_service;
pub mod preview_service;
pub mod report_service;
pub mod session;
