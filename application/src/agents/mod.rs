//! The three interview agents.
//!
//! Each agent issues a completion through the gateway port and converts the
//! result into a typed decision. Agents receive read access to the
//! [`InterviewState`] and return an output payload; they never hold a
//! mutable handle to session state.

pub mod evaluator;
pub mod interviewer;
pub mod observer;
pub mod prompts;

pub use evaluator::EvaluatorAgent;
pub use interviewer::InterviewerAgent;
pub use observer::ObserverAgent;

use crate::ports::completion_gateway::GatewayError;
use coach_domain::{ExtractionError, InterviewState, Message, Role};
use thiserror::Error;

/// Errors surfaced by an agent after its own recovery attempts.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("{agent} produced an invalid payload: {reason}")]
    SchemaValidation { agent: &'static str, reason: String },

    #[error("{agent} failed after {attempts} generation attempts")]
    RetriesExhausted { agent: &'static str, attempts: u32 },
}

/// Build the message list for a completion: system prompt, prior history
/// with role alternation fixed up, then the current content.
///
/// The trailing user message of the history is dropped (the current
/// content replaces it), and a history that opens with an assistant
/// message gets a synthetic user opener so strict backends accept the
/// alternation.
pub(crate) fn build_messages(
    system_prompt: &str,
    history: &[Message],
    content: impl Into<String>,
) -> Vec<Message> {
    let mut messages = vec![Message::system(system_prompt)];

    let mut history = history;
    if history.last().is_some_and(|m| m.role == Role::User) {
        history = &history[..history.len() - 1];
    }
    if history.first().is_some_and(|m| m.role == Role::Assistant) {
        messages.push(Message::user("Let's begin the interview."));
    }
    messages.extend_from_slice(history);

    messages.push(Message::user(content));
    messages
}

/// Job-description context block, empty when no description was provided.
pub(crate) fn job_description_block(state: &InterviewState) -> String {
    match &state.job_description {
        Some(description) => format!(
            "\n## JOB DESCRIPTION\nThis interview targets a specific opening. \
             Adapt your work to its requirements.\n<job_description>\n{description}\n</job_description>\n"
        ),
        None => String::new(),
    }
}
