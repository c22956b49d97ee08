//! Configuration file loading.

mod file_config;
mod loader;

pub use file_config::{
    FileAgentParams, FileAgentsConfig, FileConfig, FileInterviewConfig, FileLlmConfig,
    FileTranscriptConfig,
};
pub use loader::ConfigLoader;
