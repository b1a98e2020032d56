use super::grading;
use super::ClassificationEngine;
use crate::error::EngineError;
use crate::models::classify_types::{ClassificationResult, DrGrade, RetinalFeatures};
use crate::models::image_types::UploadedImage;
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    file_name: &'a str,
    mime_type: &'a str,
    image_base64: String,
}

/// Wire shape of a remote grading. Every field is optional here so a missing
/// one can be reported as a contract violation rather than a decode error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteClassification {
    pub label: Option<DrGrade>,
    pub confidence: Option<f32>,
    pub severity: Option<u8>,
    pub description: Option<String>,
    pub recommendation: Option<String>,
    pub features: Option<RemoteFeatures>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFeatures {
    pub microaneurysms: Option<bool>,
    pub hemorrhages: Option<bool>,
    pub exudates: Option<bool>,
    pub cotton_wool_spots: Option<bool>,
    pub neovascularization: Option<bool>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, EngineError> {
    value.ok_or_else(|| EngineError::Failure(format!("response missing field '{}'", field)))
}

/// Turn a remote response into a checked result.
///
/// Description and recommendation must be present, but the stored text always
/// comes from the severity table so every engine reports the same wording.
pub fn into_result(remote: RemoteClassification) -> Result<ClassificationResult, EngineError> {
    let label = required(remote.label, "label")?;
    let confidence = required(remote.confidence, "confidence")?;
    let severity = required(remote.severity, "severity")?;
    required(remote.description, "description")?;
    required(remote.recommendation, "recommendation")?;
    let timestamp = required(remote.timestamp, "timestamp")?;
    let f = required(remote.features, "features")?;

    let features = RetinalFeatures {
        microaneurysms: required(f.microaneurysms, "features.microaneurysms")?,
        hemorrhages: required(f.hemorrhages, "features.hemorrhages")?,
        exudates: required(f.exudates, "features.exudates")?,
        cotton_wool_spots: required(f.cotton_wool_spots, "features.cottonWoolSpots")?,
        neovascularization: required(f.neovascularization, "features.neovascularization")?,
    };

    let grade = grading::grade_for_severity(severity)
        .map(|info| info.grade)
        .ok_or_else(|| EngineError::Failure(format!("severity {} outside 0..=4", severity)))?;
    if grade != label {
        return Err(EngineError::Failure(format!(
            "label {:?} does not match severity {}",
            label, severity
        )));
    }

    let result = grading::build_result(grade, confidence, features, timestamp);
    grading::check_result(&result)?;
    Ok(result)
}

/// Engine backed by an HTTP grading service.
pub struct RemoteEngine {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl RemoteEngine {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Failure(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, err: reqwest::Error) -> EngineError {
        if err.is_timeout() {
            EngineError::Timeout(self.timeout)
        } else {
            EngineError::Failure(err.to_string())
        }
    }
}

#[async_trait]
impl ClassificationEngine for RemoteEngine {
    fn name(&self) -> &str {
        "remote"
    }

    async fn classify(&self, image: &UploadedImage) -> Result<ClassificationResult, EngineError> {
        let request = ClassifyRequest {
            file_name: &image.name,
            mime_type: &image.mime_type,
            image_base64: base64::engine::general_purpose::STANDARD.encode(image.bytes.as_slice()),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(EngineError::Failure(format!(
                "grading service returned HTTP {}",
                response.status()
            )));
        }

        let remote: RemoteClassification = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        into_result(remote).inspect_err(|e| {
            tracing::warn!(endpoint = %self.endpoint, error = %e, "remote response rejected");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<ClassificationResult, EngineError> {
        into_result(serde_json::from_value(value).unwrap())
    }

    fn valid() -> serde_json::Value {
        json!({
            "label": "SevereNPDR",
            "confidence": 0.81,
            "severity": 3,
            "description": "anything",
            "recommendation": "anything",
            "features": {
                "microaneurysms": true,
                "hemorrhages": true,
                "exudates": false,
                "cottonWoolSpots": true,
                "neovascularization": false
            },
            "timestamp": "2024-05-01T10:00:00Z"
        })
    }

    #[test]
    fn accepts_a_complete_response() {
        let result = parse(valid()).unwrap();
        assert_eq!(result.label, DrGrade::SevereNPDR);
        assert_eq!(result.severity, 3);
        assert_eq!(result.description, "Extensive hemorrhages, cotton-wool spots");
        assert!(result.features.cotton_wool_spots);
    }

    #[test]
    fn missing_field_is_a_failure() {
        let mut body = valid();
        body.as_object_mut().unwrap().remove("confidence");
        let err = parse(body).unwrap_err();
        assert_eq!(
            err,
            EngineError::Failure("response missing field 'confidence'".into())
        );

        let mut body = valid();
        body["features"].as_object_mut().unwrap().remove("exudates");
        assert!(matches!(parse(body), Err(EngineError::Failure(_))));
    }

    #[test]
    fn out_of_range_values_are_failures() {
        let mut body = valid();
        body["severity"] = json!(7);
        assert!(matches!(parse(body), Err(EngineError::Failure(_))));

        let mut body = valid();
        body["confidence"] = json!(1.5);
        assert!(matches!(parse(body), Err(EngineError::Failure(_))));

        let mut body = valid();
        body["label"] = json!("NoDR");
        assert!(matches!(parse(body), Err(EngineError::Failure(_))));

        let mut body = valid();
        body["features"]["neovascularization"] = json!(true);
        assert!(matches!(parse(body), Err(EngineError::Failure(_))));
    }
}
