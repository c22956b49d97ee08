//! Infrastructure layer for interview-coach
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the HTTP completion gateway, configuration file
//! loading, transcript persistence, and session observability.

pub mod config;
pub mod logging;
pub mod observability;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigLoader, FileAgentParams, FileConfig, FileLlmConfig, FileTranscriptConfig};
pub use logging::JsonTranscriptStore;
pub use observability::TracingInterviewTracker;
pub use providers::LiteLlmGateway;
