//! Transcript persistence adapters.

mod json_transcript;

pub use json_transcript::JsonTranscriptStore;
