//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file and
//! are converted into the application-layer [`InterviewConfig`] plus the
//! adapter settings that never leave this crate.

use coach_application::{AgentParams, AgentSettings, InterviewConfig};
use serde::{Deserialize, Serialize};

/// Completion backend settings (`[llm]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Base URL of the OpenAI-compatible proxy.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Transport-level retries for transient backend failures.
    pub retries: u32,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
            retries: 3,
        }
    }
}

/// Interview flow settings (`[interview]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInterviewConfig {
    pub max_turns: u32,
    pub history_window_turns: usize,
    pub greeting_max_tokens: u32,
}

impl Default for FileInterviewConfig {
    fn default() -> Self {
        let defaults = InterviewConfig::default();
        Self {
            max_turns: defaults.max_turns,
            history_window_turns: defaults.history_window_turns,
            greeting_max_tokens: defaults.greeting_max_tokens,
        }
    }
}

/// Per-agent overrides (`[agents.observer]` etc.).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub generation_retries: Option<u32>,
}

impl FileAgentParams {
    fn apply(&self, base: AgentParams) -> AgentParams {
        AgentParams {
            temperature: self.temperature.unwrap_or(base.temperature),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            generation_retries: self.generation_retries.unwrap_or(base.generation_retries),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    pub observer: FileAgentParams,
    pub interviewer: FileAgentParams,
    pub evaluator: FileAgentParams,
}

/// Transcript persistence settings (`[transcripts]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTranscriptConfig {
    pub enabled: bool,
    /// Output directory, relative to the working directory.
    pub dir: String,
}

impl Default for FileTranscriptConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "logs".to_string(),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub llm: FileLlmConfig,
    pub interview: FileInterviewConfig,
    pub agents: FileAgentsConfig,
    pub transcripts: FileTranscriptConfig,
}

impl FileConfig {
    /// Build the application-layer session configuration from this file.
    pub fn interview_config(&self) -> InterviewConfig {
        let defaults = AgentSettings::default();
        InterviewConfig {
            model: self.llm.model.clone(),
            max_turns: self.interview.max_turns,
            job_description: None,
            history_window_turns: self.interview.history_window_turns,
            greeting_max_tokens: self.interview.greeting_max_tokens,
            agents: AgentSettings {
                observer: self.agents.observer.apply(defaults.observer),
                interviewer: self.agents.interviewer.apply(defaults.interviewer),
                evaluator: self.agents.evaluator.apply(defaults.evaluator),
            },
        }
    }
}
