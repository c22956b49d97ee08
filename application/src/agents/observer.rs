//! Observer agent: structured analysis of every candidate reply.

use std::sync::Arc;

use coach_domain::{
    extract_reasoning, resolve_answered, AgentThought, AnswerQuality, ExtractedCandidateInfo,
    InterviewState, ObserverAnalysis, ResponseKind,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{AgentParams, InterviewConfig};
use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest};

use super::prompts::OBSERVER_SYSTEM_PROMPT;
use super::{build_messages, job_description_block, AgentError};

const AGENT_NAME: &str = "Observer";

/// Wire shape of the observer payload. Every field is optional so a model
/// that drops a key still yields a usable analysis, and the vocabulary
/// fields tolerate invented labels; only a structurally malformed value
/// fails the attempt.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    response_type: Option<String>,
    quality: Option<String>,
    is_factually_correct: Option<bool>,
    is_gibberish: Option<bool>,
    answered_last_question: Option<bool>,
    #[serde(default)]
    detected_topics: Vec<String>,
    recommendation: Option<String>,
    #[serde(default)]
    should_simplify: bool,
    #[serde(default)]
    should_increase_difficulty: bool,
    correct_answer: Option<String>,
    extracted_info: Option<ExtractedCandidateInfo>,
    demonstrated_level: Option<String>,
    thoughts: Option<String>,
}

pub struct ObserverAgent {
    gateway: Arc<dyn CompletionGateway>,
    model: String,
    params: AgentParams,
    history_window_turns: usize,
}

impl ObserverAgent {
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: &InterviewConfig) -> Self {
        Self {
            gateway,
            model: config.model.clone(),
            params: config.agents.observer,
            history_window_turns: config.history_window_turns,
        }
    }

    /// Analyze one candidate message against the current session state.
    ///
    /// Schema and extraction failures are retried up to the configured
    /// generation attempts; gateway errors have already been retried by
    /// the adapter and propagate immediately.
    pub async fn analyze(
        &self,
        session_id: &str,
        state: &InterviewState,
        candidate_message: &str,
    ) -> Result<ObserverAnalysis, AgentError> {
        let content = self.build_analysis_request(state, candidate_message);
        let history = windowed_history(state, self.history_window_turns);
        let messages = build_messages(OBSERVER_SYSTEM_PROMPT, &history, content);

        let request = CompletionRequest::new(session_id, "observer_analysis", &self.model, messages)
            .with_sampling(self.params.temperature, self.params.max_tokens);

        let attempts = self.params.generation_retries + 1;
        let mut last_reason = String::new();
        for attempt in 1..=attempts {
            let completion = self.gateway.complete_structured(&request).await?;
            match serde_json::from_value::<RawAnalysis>(Value::Object(completion.payload)) {
                Ok(raw) => {
                    debug!(session_id, attempt, "observer analysis parsed");
                    return Ok(self.finish(raw, &completion.raw));
                }
                Err(err) => {
                    warn!(
                        session_id,
                        attempt,
                        error = %err,
                        "observer payload failed schema validation"
                    );
                    last_reason = err.to_string();
                }
            }
        }

        if self.params.generation_retries == 0 {
            return Err(AgentError::SchemaValidation {
                agent: AGENT_NAME,
                reason: last_reason,
            });
        }
        Err(AgentError::RetriesExhausted {
            agent: AGENT_NAME,
            attempts,
        })
    }

    fn build_analysis_request(&self, state: &InterviewState, candidate_message: &str) -> String {
        let active_question = state
            .active_question()
            .unwrap_or("(no question asked yet)");
        let job_block = job_description_block(state);
        format!(
            "## CONTEXT\n\
             Current difficulty: {difficulty:?}\n\
             Last interviewer message (the active question):\n{active_question}\n\
             {job_block}\n\
             ## CANDIDATE MESSAGE\n\
             <user_input>\n{candidate_message}\n</user_input>\n\n\
             Analyze the candidate's message and output your verdict.",
            difficulty = state.current_difficulty,
        )
    }

    /// Fill defaults, resolve the answered flag with fixed precedence, and
    /// enforce the difficulty invariant.
    fn finish(&self, raw: RawAnalysis, raw_text: &str) -> ObserverAnalysis {
        let kind = wire_enum(raw.response_type, ResponseKind::Normal);
        let is_gibberish = raw.is_gibberish.unwrap_or(false);
        let answered = resolve_answered(is_gibberish, raw.answered_last_question, kind);

        let mut thoughts = Vec::new();
        if let Some(reasoning) = extract_reasoning(raw_text) {
            thoughts.push(AgentThought::new(AGENT_NAME, AGENT_NAME, reasoning));
        }
        if let Some(private) = raw.thoughts.filter(|t| !t.trim().is_empty()) {
            thoughts.push(AgentThought::new(AGENT_NAME, "Interviewer", private));
        }

        let mut analysis = ObserverAnalysis {
            kind,
            quality: wire_enum(raw.quality, AnswerQuality::Acceptable),
            is_factually_correct: raw.is_factually_correct.unwrap_or(true),
            is_gibberish,
            answered_last_question: answered,
            detected_topics: raw.detected_topics,
            recommendation: raw.recommendation.unwrap_or_default(),
            should_simplify: raw.should_simplify,
            should_increase_difficulty: raw.should_increase_difficulty,
            correct_answer: raw
                .correct_answer
                .filter(|c| !c.trim().is_empty() && c != "null"),
            extracted_info: raw.extracted_info.filter(|i| !i.is_empty()),
            demonstrated_level: raw.demonstrated_level.filter(|l| !l.trim().is_empty()),
            thoughts,
        };
        analysis.enforce_invariants();
        analysis
    }
}

/// Parse a vocabulary value through the enum's serde form. A label the
/// model invented falls back instead of burning a generation attempt.
fn wire_enum<T: serde::de::DeserializeOwned>(raw: Option<String>, fallback: T) -> T {
    let Some(value) = raw else {
        return fallback;
    };
    match serde_json::from_value(Value::String(value.clone())) {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(value, "classification outside the vocabulary, using fallback");
            fallback
        }
    }
}

/// Last `window` turns of conversation, role-tagged.
pub(crate) fn windowed_history(state: &InterviewState, window: usize) -> Vec<coach_domain::Message> {
    let history = state.conversation_history();
    let keep = window * 2;
    if history.len() > keep {
        history[history.len() - keep..].to_vec()
    } else {
        history
    }
}
