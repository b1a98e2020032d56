use crate::models::classify_types::ClassificationResult;
use crate::models::image_types::UploadedImage;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    ImageSelected,
    Analyzing,
    ResultReady,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::ImageSelected => "image-selected",
            SessionState::Analyzing => "analyzing",
            SessionState::ResultReady => "result-ready",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub image: UploadedImage,
    pub result: ClassificationResult,
    pub filename: String,
}

impl HistoryEntry {
    pub fn new(image: UploadedImage, result: ClassificationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: image.name.clone(),
            image,
            result,
        }
    }
}

/// Read-only view of the session handed to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub image: Option<UploadedImage>,
    pub result: Option<ClassificationResult>,
    pub history_len: usize,
}
