//! Transcript persistence port.
//!
//! At termination the orchestrator writes two records: a compact
//! turn-by-turn summary and a detailed structured dump. Each is written
//! exactly once per session. Persistence failures are reported but must
//! not lose the feedback already produced.

use super::observability::SessionMetrics;
use coach_domain::{InterviewFeedback, InterviewState};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Failed to write transcript: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize transcript: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for the log-persistence collaborator.
pub trait TranscriptStore: Send + Sync {
    /// Write the compact turn-by-turn record: visible messages, candidate
    /// messages, and flattened private-thought text, plus the formatted
    /// feedback.
    fn save_summary(
        &self,
        state: &InterviewState,
        feedback: &InterviewFeedback,
    ) -> Result<PathBuf, TranscriptError>;

    /// Write the detailed record: full structured state, per-turn
    /// timestamps, the full feedback object, and aggregated token metrics.
    fn save_detailed(
        &self,
        state: &InterviewState,
        feedback: &InterviewFeedback,
        metrics: Option<&SessionMetrics>,
    ) -> Result<PathBuf, TranscriptError>;
}

/// No-op store for tests and when persistence is disabled.
pub struct NoTranscriptStore;

impl TranscriptStore for NoTranscriptStore {
    fn save_summary(
        &self,
        _state: &InterviewState,
        _feedback: &InterviewFeedback,
    ) -> Result<PathBuf, TranscriptError> {
        Ok(PathBuf::new())
    }

    fn save_detailed(
        &self,
        _state: &InterviewState,
        _feedback: &InterviewFeedback,
        _metrics: Option<&SessionMetrics>,
    ) -> Result<PathBuf, TranscriptError> {
        Ok(PathBuf::new())
    }
}
