use chrono::{DateTime, Local};
use serde::Serialize;

pub const DEFAULT_ANALYSIS_TYPE: &str = "AI-Assisted Screening";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub analysis_type: String,
    pub image_name: Option<String>,
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self {
            analysis_type: DEFAULT_ANALYSIS_TYPE.to_string(),
            image_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub patient_id: String,
    pub generated_at: DateTime<Local>,
    pub file_name: String,
    pub text: String,
}
