use super::grading::{self, GRADES};
use super::ClassificationEngine;
use crate::error::EngineError;
use crate::models::classify_types::{ClassificationResult, RetinalFeatures};
use crate::models::image_types::UploadedImage;
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(3000);

// A flag is set when a uniform draw exceeds its threshold.
const MICROANEURYSM_THRESHOLD: f64 = 0.6;
const HEMORRHAGE_THRESHOLD: f64 = 0.7;
const EXUDATE_THRESHOLD: f64 = 0.8;
const COTTON_WOOL_THRESHOLD: f64 = 0.9;

/// Stand-in engine: picks a grade uniformly at random after a fixed delay.
pub struct MockEngine {
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl MockEngine {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible engine; the same seed yields the same sequence of grades and flags.
    pub fn with_seed(latency: Duration, seed: u64) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    async fn draw(&self) -> (usize, RetinalFeatures) {
        let mut rng = self.rng.lock().await;
        let row = rng.gen_range(0..GRADES.len());
        let features = RetinalFeatures {
            microaneurysms: rng.gen::<f64>() > MICROANEURYSM_THRESHOLD,
            hemorrhages: rng.gen::<f64>() > HEMORRHAGE_THRESHOLD,
            exudates: rng.gen::<f64>() > EXUDATE_THRESHOLD,
            cotton_wool_spots: rng.gen::<f64>() > COTTON_WOOL_THRESHOLD,
            neovascularization: GRADES[row].grade.severity() == 4,
        };
        (row, features)
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

#[async_trait]
impl ClassificationEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, image: &UploadedImage) -> Result<ClassificationResult, EngineError> {
        let (row, features) = self.draw().await;
        tracing::debug!(image = %image.name, row, ?features, "mock draw");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let info = &GRADES[row];
        Ok(grading::build_result(
            info.grade,
            info.base_confidence,
            features,
            Utc::now(),
        ))
    }
}
