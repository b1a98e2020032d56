pub mod grading;
pub mod mock;
pub mod remote;

use crate::error::EngineError;
use crate::models::classify_types::ClassificationResult;
use crate::models::image_types::UploadedImage;
use async_trait::async_trait;

/// Anything that can grade a fundus image.
///
/// Implementations resolve in bounded time and only emit results that pass
/// [`grading::check_result`]. The session controller wraps calls with its own
/// deadline and cancellation, so engines may simply be dropped mid-flight.
#[async_trait]
pub trait ClassificationEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, image: &UploadedImage) -> Result<ClassificationResult, EngineError>;
}
