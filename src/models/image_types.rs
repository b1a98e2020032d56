use serde::Serialize;
use std::sync::Arc;

/// A file handed to the ingestor: a declared MIME type plus its contents.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewHandle {
    /// `data:<mime>;base64,...` of the original bytes.
    pub data_uri: String,
    /// Small JPEG thumbnail as a data URI, when the bytes decode.
    pub thumbnail: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A validated image owned by the session until replaced or cleared.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(skip)]
    pub bytes: Arc<Vec<u8>>,
    pub preview: PreviewHandle,
}
