//! Interview session configuration.
//!
//! [`InterviewConfig`] groups everything the caller may tune per session:
//! the target model, the turn limit, an optional job description, and
//! per-agent sampling/retry parameters. `generation_retries` bounds how
//! many times an agent re-generates after a schema/extraction failure
//! before surfacing an [`AgentError`](crate::agents::AgentError) — it is
//! configuration, not a hardcoded policy.

use serde::{Deserialize, Serialize};

/// Sampling and retry parameters for one agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgentParams {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Bounded re-generation attempts after a schema-validation or
    /// extraction failure (0 = fail on the first bad payload).
    pub generation_retries: u32,
}

/// Parameters for all three agents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub observer: AgentParams,
    pub interviewer: AgentParams,
    pub evaluator: AgentParams,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            observer: AgentParams {
                temperature: 0.3,
                max_tokens: 1000,
                generation_retries: 2,
            },
            interviewer: AgentParams {
                temperature: 0.7,
                max_tokens: 800,
                generation_retries: 0,
            },
            evaluator: AgentParams {
                temperature: 0.3,
                max_tokens: 3000,
                generation_retries: 2,
            },
        }
    }
}

/// Full configuration for one interview session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Target model identifier, as understood by the completion backend.
    pub model: String,
    /// Hard limit on completed turns; reaching it terminates the session.
    pub max_turns: u32,
    pub job_description: Option<String>,
    /// Turns of history included in the interviewer's context window.
    pub history_window_turns: usize,
    /// Token ceiling for the one-shot greeting generation.
    pub greeting_max_tokens: u32,
    pub agents: AgentSettings,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_turns: 20,
            job_description: None,
            history_window_turns: 5,
            greeting_max_tokens: 300,
            agents: AgentSettings::default(),
        }
    }
}

impl InterviewConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_job_description(mut self, job_description: impl Into<String>) -> Self {
        let text = job_description.into();
        let trimmed = text.trim();
        self.job_description = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_agent_defaults() {
        let settings = AgentSettings::default();
        assert_eq!(settings.observer.generation_retries, 2);
        assert_eq!(settings.interviewer.generation_retries, 0);
        assert_eq!(settings.evaluator.max_tokens, 3000);
    }

    #[test]
    fn blank_job_description_becomes_none() {
        let config = InterviewConfig::default().with_job_description("   \n");
        assert!(config.job_description.is_none());

        let config = InterviewConfig::default().with_job_description(" Rust backend role ");
        assert_eq!(config.job_description.as_deref(), Some("Rust backend role"));
    }
}
