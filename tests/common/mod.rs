#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use dr_screen_lib::services::classifier::grading::build_result;
use dr_screen_lib::{
    ClassificationEngine, ClassificationResult, DrGrade, EngineError, ImageFile, RetinalFeatures,
    UploadedImage,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

pub fn png_file(name: &str, size: usize) -> ImageFile {
    ImageFile::new(name, "image/png", vec![0u8; size])
}

pub fn no_dr() -> ClassificationResult {
    build_result(DrGrade::NoDR, 0.92, RetinalFeatures::default(), Utc::now())
}

/// Blocks inside `classify` until released, so tests can observe `Analyzing`.
#[derive(Default)]
pub struct GatedEngine {
    pub started: Notify,
    pub release: Notify,
    calls: AtomicUsize,
}

impl GatedEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassificationEngine for GatedEngine {
    fn name(&self) -> &str {
        "gated"
    }

    async fn classify(&self, _image: &UploadedImage) -> Result<ClassificationResult, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(no_dr())
    }
}

/// Always fails with the given error.
pub struct FailingEngine(pub EngineError);

#[async_trait]
impl ClassificationEngine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    async fn classify(&self, _image: &UploadedImage) -> Result<ClassificationResult, EngineError> {
        Err(self.0.clone())
    }
}

/// Takes longer than any test deadline.
pub struct SlowEngine(pub Duration);

#[async_trait]
impl ClassificationEngine for SlowEngine {
    fn name(&self) -> &str {
        "slow"
    }

    async fn classify(&self, _image: &UploadedImage) -> Result<ClassificationResult, EngineError> {
        tokio::time::sleep(self.0).await;
        Ok(no_dr())
    }
}

/// Emits a result whose label disagrees with its severity.
pub struct LyingEngine;

#[async_trait]
impl ClassificationEngine for LyingEngine {
    fn name(&self) -> &str {
        "lying"
    }

    async fn classify(&self, _image: &UploadedImage) -> Result<ClassificationResult, EngineError> {
        let mut result = no_dr();
        result.severity = 4;
        Ok(result)
    }
}

/// Panics on its first call, then behaves.
#[derive(Default)]
pub struct PanicOnceEngine {
    calls: AtomicUsize,
}

#[async_trait]
impl ClassificationEngine for PanicOnceEngine {
    fn name(&self) -> &str {
        "panic-once"
    }

    async fn classify(&self, _image: &UploadedImage) -> Result<ClassificationResult, EngineError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("engine bug");
        }
        Ok(no_dr())
    }
}
