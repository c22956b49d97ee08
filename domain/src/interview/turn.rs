//! Interview turns and private agent thoughts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A private thought passed between agents, never shown to the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentThought {
    pub from_agent: String,
    pub to_agent: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentThought {
    pub fn new(
        from_agent: impl Into<String>,
        to_agent: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            from_agent: from_agent.into(),
            to_agent: to_agent.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One interviewer-message/candidate-message pair plus private reasoning.
///
/// A turn is *open* while the candidate message is unset. The orchestrator
/// always writes the incoming candidate message into the most recent open
/// turn, and opens the next turn only after a fully successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewTurn {
    pub turn_id: u32,
    pub interviewer_message: String,
    pub candidate_message: Option<String>,
    pub thoughts: Vec<AgentThought>,
    pub timestamp: DateTime<Utc>,
}

impl InterviewTurn {
    pub fn new(turn_id: u32, interviewer_message: impl Into<String>) -> Self {
        Self {
            turn_id,
            interviewer_message: interviewer_message.into(),
            candidate_message: None,
            thoughts: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// A turn is open until the candidate message is recorded.
    pub fn is_open(&self) -> bool {
        self.candidate_message.is_none()
    }

    /// Compact record for the summary transcript: visible messages plus the
    /// private thoughts flattened into a single `[Agent]: ...` string.
    pub fn to_log_record(&self) -> serde_json::Value {
        let thoughts = self
            .thoughts
            .iter()
            .map(|t| format!("[{}]: {}", t.from_agent, t.content))
            .collect::<Vec<_>>()
            .join(" ");

        serde_json::json!({
            "turn_id": self.turn_id,
            "interviewer_message": self.interviewer_message,
            "candidate_message": self.candidate_message.as_deref().unwrap_or(""),
            "internal_thoughts": thoughts,
        })
    }
}
