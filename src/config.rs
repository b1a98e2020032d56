use crate::error::ConfigError;
use crate::models::report_types::{ReportMetadata, DEFAULT_ANALYSIS_TYPE};
use crate::services::classifier::mock::MockEngine;
use crate::services::classifier::remote::RemoteEngine;
use crate::services::classifier::ClassificationEngine;
use crate::services::session::controller::SessionController;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Mock,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub kind: EngineKind,
    /// Simulated processing time of the mock engine.
    pub latency_ms: u64,
    /// Fixes the mock engine's draws.
    pub seed: Option<u64>,
    /// Deadline for each classification. Required for the remote engine.
    pub timeout_secs: Option<u64>,
    pub endpoint: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::Mock,
            latency_ms: crate::services::classifier::mock::DEFAULT_LATENCY.as_millis() as u64,
            seed: None,
            timeout_secs: None,
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub analysis_type: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            analysis_type: DEFAULT_ANALYSIS_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub engine: EngineConfig,
    pub report: ReportConfig,
}

impl ScreeningConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScreeningConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("engine.timeout_secs must be positive".into()));
        }
        if self.engine.kind == EngineKind::Remote {
            if self.engine.endpoint.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::Invalid("remote engine requires engine.endpoint".into()));
            }
            if self.engine.timeout_secs.is_none() {
                return Err(ConfigError::Invalid(
                    "remote engine requires engine.timeout_secs".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.engine.timeout_secs.map(Duration::from_secs)
    }

    pub fn report_metadata(&self, image_name: Option<String>) -> ReportMetadata {
        ReportMetadata {
            analysis_type: self.report.analysis_type.clone(),
            image_name,
        }
    }

    pub fn build_engine(&self) -> Result<Arc<dyn ClassificationEngine>, ConfigError> {
        self.validate()?;
        let engine: Arc<dyn ClassificationEngine> = match self.engine.kind {
            EngineKind::Mock => {
                let latency = Duration::from_millis(self.engine.latency_ms);
                match self.engine.seed {
                    Some(seed) => Arc::new(MockEngine::with_seed(latency, seed)),
                    None => Arc::new(MockEngine::new(latency)),
                }
            }
            EngineKind::Remote => {
                let endpoint = self.engine.endpoint.clone().unwrap_or_default();
                let timeout = self.deadline().unwrap_or_default();
                let remote = RemoteEngine::new(endpoint, timeout)
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                Arc::new(remote)
            }
        };
        Ok(engine)
    }

    /// Controller wired to the configured engine and deadline.
    pub fn build_controller(&self) -> Result<SessionController, ConfigError> {
        let controller = SessionController::new(self.build_engine()?);
        Ok(match self.deadline() {
            Some(deadline) => controller.with_deadline(deadline),
            None => controller,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ScreeningConfig::from_toml_str("").unwrap();
        assert_eq!(config, ScreeningConfig::default());
        assert_eq!(config.engine.kind, EngineKind::Mock);
        assert_eq!(config.engine.latency_ms, 3000);
        assert_eq!(config.report.analysis_type, "AI-Assisted Screening");
        assert!(config.deadline().is_none());
    }

    #[test]
    fn parses_engine_section() {
        let config = ScreeningConfig::from_toml_str(
            r#"
            [engine]
            kind = "mock"
            latency_ms = 10
            seed = 99
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.seed, Some(99));
        assert_eq!(config.deadline(), Some(Duration::from_secs(5)));
        assert_eq!(config.build_engine().unwrap().name(), "mock");
    }

    #[test]
    fn remote_needs_endpoint_and_timeout() {
        let err = ScreeningConfig::from_toml_str("[engine]\nkind = \"remote\"\ntimeout_secs = 5\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ScreeningConfig::from_toml_str(
            "[engine]\nkind = \"remote\"\nendpoint = \"http://localhost:9000/grade\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = ScreeningConfig::from_toml_str(
            "[engine]\nkind = \"remote\"\nendpoint = \"http://localhost:9000/grade\"\ntimeout_secs = 30\n",
        )
        .unwrap();
        assert_eq!(config.build_engine().unwrap().name(), "remote");
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let err = ScreeningConfig::from_toml_str("[engine]\nkind = \"onnx\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ScreeningConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
