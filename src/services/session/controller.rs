use super::history::SessionHistory;
use super::{AnalysisTicket, Session};
use crate::error::{EngineError, SessionError};
use crate::models::classify_types::ClassificationResult;
use crate::models::image_types::{ImageFile, UploadedImage};
use crate::models::session_types::{HistoryEntry, SessionSnapshot, SessionState};
use crate::services::classifier::{grading, ClassificationEngine};
use crate::services::ingest_service::ImageIngestor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Owns the session and sequences upload, analysis and history.
///
/// Cloning is cheap and every clone drives the same session. The session lock
/// is only held across synchronous transitions, never across decoding or
/// classification, so a second `analyze` observes `Analyzing` and is rejected.
/// Locks are always taken session first, then history.
#[derive(Clone)]
pub struct SessionController {
    session: Arc<Mutex<Session>>,
    history: Arc<Mutex<SessionHistory>>,
    engine: Arc<dyn ClassificationEngine>,
    ingestor: ImageIngestor,
    deadline: Option<Duration>,
}

impl SessionController {
    pub fn new(engine: Arc<dyn ClassificationEngine>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            history: Arc::new(Mutex::new(SessionHistory::new())),
            engine,
            ingestor: ImageIngestor::new(),
            deadline: None,
        }
    }

    /// Bound every classification by `deadline`; elapsed calls fail with `EngineError::Timeout`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    pub async fn current_image(&self) -> Option<UploadedImage> {
        self.session.lock().await.image().cloned()
    }

    pub async fn current_result(&self) -> Option<ClassificationResult> {
        self.session.lock().await.result().cloned()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        let history = self.history.lock().await;
        SessionSnapshot {
            state: session.state(),
            image: session.image().cloned(),
            result: session.result().cloned(),
            history_len: history.len(),
        }
    }

    /// Newest first.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.to_vec()
    }

    pub async fn history_entry(&self, id: uuid::Uuid) -> Option<HistoryEntry> {
        self.history.lock().await.get(id).cloned()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    /// Validate `file` and make it the current image.
    ///
    /// A rejected file leaves the session exactly as it was.
    pub async fn upload(&self, file: ImageFile) -> Result<UploadedImage, SessionError> {
        let image = self.ingestor.validate(file).await?;
        self.session.lock().await.select_image(image.clone());
        tracing::info!(name = %image.name, size_bytes = image.size_bytes, "image selected");
        Ok(image)
    }

    /// Return the session to `Idle`, abandoning any analysis in flight.
    pub async fn clear(&self) {
        self.session.lock().await.clear();
    }

    /// Abort the analysis in flight. Returns false when nothing was running.
    pub async fn cancel_analysis(&self) -> bool {
        let cancelled = self.session.lock().await.cancel_analysis();
        if cancelled {
            tracing::info!("analysis cancelled");
        }
        cancelled
    }

    /// Classify the current image.
    ///
    /// Rejected (not queued) when no image is selected or an analysis is
    /// already running. The classification runs on its own task, so dropping
    /// the returned future does not leave the session stuck in `Analyzing`.
    pub async fn analyze(&self) -> Result<ClassificationResult, SessionError> {
        let ticket = {
            let mut session = self.session.lock().await;
            session.begin_analysis().inspect_err(|e| {
                tracing::warn!(state = %session.state(), error = %e, "analyze rejected");
            })?
        };
        tracing::info!(image = %ticket.image.name, engine = self.engine.name(), "analysis started");

        let this = self.clone();
        let task_ticket = ticket.clone();
        match tokio::spawn(async move { this.run_analysis(task_ticket).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(image = %ticket.image.name, error = %e, "analysis task failed");
                let error = EngineError::Failure(format!("analysis task failed: {}", e));
                Err(self.session.lock().await.fail_analysis(&ticket, error.into()))
            }
        }
    }

    async fn run_analysis(&self, ticket: AnalysisTicket) -> Result<ClassificationResult, SessionError> {
        let outcome = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => Err(EngineError::Cancelled),
            res = self.classify_with_deadline(&ticket.image) => res,
        };
        let outcome = outcome.and_then(|result| grading::check_result(&result).map(|_| result));

        let mut session = self.session.lock().await;
        match outcome {
            Ok(result) => {
                let entry = session.complete_analysis(&ticket, result.clone()).inspect_err(|e| {
                    tracing::info!(image = %ticket.image.name, error = %e, "stale result discarded");
                })?;
                let mut history = self.history.lock().await;
                history.append(entry);
                tracing::info!(
                    image = %ticket.image.name,
                    label = %result.label,
                    severity = result.severity,
                    confidence = result.confidence,
                    history_len = history.len(),
                    "analysis complete"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(image = %ticket.image.name, error = %e, "analysis failed");
                Err(session.fail_analysis(&ticket, e.into()))
            }
        }
    }

    async fn classify_with_deadline(
        &self,
        image: &UploadedImage,
    ) -> Result<ClassificationResult, EngineError> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.engine.classify(image))
                .await
                .unwrap_or(Err(EngineError::Timeout(deadline))),
            None => self.engine.classify(image).await,
        }
    }
}
