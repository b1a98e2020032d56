use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Rejections raised while validating an incoming image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported file type '{mime_type}', expected an image")]
    InvalidType { mime_type: String },

    #[error("image is {size_bytes} bytes, limit is {limit} bytes")]
    TooLarge { size_bytes: u64, limit: u64 },
}

/// Failures of a classification engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("classification timed out after {0:?}")]
    Timeout(Duration),

    #[error("classification failed: {0}")]
    Failure(String),

    #[error("classification cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("no image selected")]
    NoImage,

    #[error("an analysis is already in progress")]
    AlreadyAnalyzing,

    #[error("no analysis result available")]
    NoResult,

    #[error("analysis was superseded by a newer image")]
    Superseded,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Serializable error returned by the command layer.
#[derive(Debug, Serialize)]
pub struct AppError {
    pub kind: &'static str,
    pub message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let kind = match &err {
            SessionError::Ingest(IngestError::InvalidType { .. }) => "invalid-type",
            SessionError::Ingest(IngestError::TooLarge { .. }) => "too-large",
            SessionError::Engine(EngineError::Timeout(_)) => "timeout",
            SessionError::Engine(EngineError::Failure(_)) => "engine-failure",
            SessionError::Engine(EngineError::Cancelled) => "cancelled",
            SessionError::NoImage => "no-image",
            SessionError::AlreadyAnalyzing => "already-analyzing",
            SessionError::NoResult => "no-result",
            SessionError::Superseded => "superseded",
        };
        AppError {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        SessionError::from(err).into()
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError {
            kind: "config",
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError {
            kind: "io",
            message: err.to_string(),
        }
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError {
            kind: "other",
            message: msg,
        }
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError {
            kind: "other",
            message: msg.to_string(),
        }
    }
}
