//! The single screening session and its state machine.
//!
//! `Session` holds the pure transitions; `SessionController` sequences them
//! around image ingestion and classification.

pub mod controller;
pub mod history;

use crate::error::SessionError;
use crate::models::classify_types::ClassificationResult;
use crate::models::image_types::UploadedImage;
use crate::models::session_types::{HistoryEntry, SessionState};
use tokio_util::sync::CancellationToken;

/// Handed out when an analysis starts; the completion must present it back.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub image: UploadedImage,
    pub token: CancellationToken,
    analysis_id: u64,
    image_generation: u64,
}

#[derive(Debug)]
pub struct Session {
    image: Option<UploadedImage>,
    result: Option<ClassificationResult>,
    state: SessionState,
    // Bumped whenever the image is replaced or cleared.
    image_generation: u64,
    // Bumped whenever an analysis starts or is abandoned.
    analysis_id: u64,
    in_flight: Option<CancellationToken>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            image: None,
            result: None,
            state: SessionState::Idle,
            image_generation: 0,
            analysis_id: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        self.result.as_ref()
    }

    /// Replace the current image. Any previous result is dropped and an
    /// in-flight analysis is cancelled.
    pub fn select_image(&mut self, image: UploadedImage) {
        self.abandon_in_flight();
        self.image_generation += 1;
        self.image = Some(image);
        self.result = None;
        self.transition(SessionState::ImageSelected);
    }

    /// Return to `Idle` from any state.
    pub fn clear(&mut self) {
        self.abandon_in_flight();
        self.image_generation += 1;
        self.image = None;
        self.result = None;
        self.transition(SessionState::Idle);
    }

    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, SessionError> {
        match self.state {
            SessionState::Idle => return Err(SessionError::NoImage),
            SessionState::Analyzing => return Err(SessionError::AlreadyAnalyzing),
            SessionState::ImageSelected | SessionState::ResultReady => {}
        }
        let image = self.image.clone().ok_or(SessionError::NoImage)?;

        let token = CancellationToken::new();
        self.analysis_id += 1;
        self.in_flight = Some(token.clone());
        self.result = None;
        self.transition(SessionState::Analyzing);

        Ok(AnalysisTicket {
            image,
            token,
            analysis_id: self.analysis_id,
            image_generation: self.image_generation,
        })
    }

    /// Whether `ticket` still belongs to the analysis in flight.
    pub fn is_current(&self, ticket: &AnalysisTicket) -> bool {
        self.state == SessionState::Analyzing && ticket.analysis_id == self.analysis_id
    }

    /// Error to report for a ticket that is no longer current.
    fn stale_error(&self, ticket: &AnalysisTicket) -> SessionError {
        if ticket.image_generation != self.image_generation {
            SessionError::Superseded
        } else {
            SessionError::Engine(crate::error::EngineError::Cancelled)
        }
    }

    /// Store a successful result and produce the history entry for it.
    pub fn complete_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        result: ClassificationResult,
    ) -> Result<HistoryEntry, SessionError> {
        if !self.is_current(ticket) {
            return Err(self.stale_error(ticket));
        }
        self.in_flight = None;
        self.result = Some(result.clone());
        self.transition(SessionState::ResultReady);
        Ok(HistoryEntry::new(ticket.image.clone(), result))
    }

    /// Roll a failed analysis back to `ImageSelected`.
    ///
    /// Returns the error to surface: the engine error for the current
    /// analysis, or the stale-ticket error if the session has moved on.
    pub fn fail_analysis(&mut self, ticket: &AnalysisTicket, error: SessionError) -> SessionError {
        if !self.is_current(ticket) {
            return self.stale_error(ticket);
        }
        self.in_flight = None;
        self.transition(SessionState::ImageSelected);
        error
    }

    /// Abort the analysis in flight. Returns false when nothing was running.
    pub fn cancel_analysis(&mut self) -> bool {
        if self.state != SessionState::Analyzing {
            return false;
        }
        self.abandon_in_flight();
        self.transition(SessionState::ImageSelected);
        true
    }

    fn abandon_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
            self.analysis_id += 1;
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::info!(from = %self.state, to = %next, "session transition");
        }
        self.state = next;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
