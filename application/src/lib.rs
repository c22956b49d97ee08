//! Application layer for interview-coach
//!
//! This crate contains the three interview agents, the port definitions for
//! external collaborators (completion backend, observability, transcript
//! persistence), and the session orchestrator that sequences them per turn.
//! It depends only on the domain layer.

pub mod agents;
pub mod config;
pub mod ports;
pub mod session;

// Re-export commonly used types
pub use agents::{AgentError, EvaluatorAgent, InterviewerAgent, ObserverAgent};
pub use config::{AgentParams, AgentSettings, InterviewConfig};
pub use ports::{
    completion_gateway::{
        Completion, CompletionGateway, CompletionRequest, GatewayError, StructuredCompletion,
        TokenUsage,
    },
    observability::{InterviewTracker, NoInterviewTracker, SessionMetrics},
    transcript_store::{NoTranscriptStore, TranscriptError, TranscriptStore},
};
pub use session::{
    orchestrator::{InterviewSession, SessionError, SessionStatus, TurnOutcome},
    store::{SessionId, SessionStore, StoreError},
};
