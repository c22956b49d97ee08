//! Interviewer agent: the only voice the candidate ever sees.

use std::sync::Arc;

use coach_domain::{InterviewState, ObserverAnalysis, ResponseKind};
use tracing::debug;

use crate::config::{AgentParams, InterviewConfig};
use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest};

use super::observer::windowed_history;
use super::prompts::{GREETING_INSTRUCTION, INTERVIEWER_SYSTEM_PROMPT};
use super::{build_messages, job_description_block, AgentError};

const AGENT_NAME: &str = "Interviewer";

pub struct InterviewerAgent {
    gateway: Arc<dyn CompletionGateway>,
    model: String,
    params: AgentParams,
    history_window_turns: usize,
    greeting_max_tokens: u32,
}

impl InterviewerAgent {
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: &InterviewConfig) -> Self {
        Self {
            gateway,
            model: config.model.clone(),
            params: config.agents.interviewer,
            history_window_turns: config.history_window_turns,
            greeting_max_tokens: config.greeting_max_tokens,
        }
    }

    /// One-shot opening message, generated outside the turn pipeline.
    pub async fn generate_greeting(
        &self,
        session_id: &str,
        state: &InterviewState,
    ) -> Result<String, AgentError> {
        let content = format!("{}{}", GREETING_INSTRUCTION, job_description_block(state));
        let messages = build_messages(INTERVIEWER_SYSTEM_PROMPT, &[], content);
        let request = CompletionRequest::new(session_id, "greeting", &self.model, messages)
            .with_sampling(self.params.temperature, self.greeting_max_tokens);

        let completion = self.gateway.complete(&request).await?;
        non_blank(completion.text).ok_or(AgentError::SchemaValidation {
            agent: AGENT_NAME,
            reason: "empty greeting".to_string(),
        })
    }

    /// Produce the visible reply for one turn, steered by the observer's
    /// verdict. Plain text in, plain text out; nothing here mutates state.
    pub async fn respond(
        &self,
        session_id: &str,
        state: &InterviewState,
        candidate_message: &str,
        analysis: &ObserverAnalysis,
    ) -> Result<String, AgentError> {
        let content = self.build_turn_request(state, candidate_message, analysis);
        let history = windowed_history(state, self.history_window_turns);
        let messages = build_messages(INTERVIEWER_SYSTEM_PROMPT, &history, content);

        let request = CompletionRequest::new(session_id, "interviewer_reply", &self.model, messages)
            .with_sampling(self.params.temperature, self.params.max_tokens);

        debug!(session_id, kind = ?analysis.kind, "requesting interviewer reply");
        let completion = self.gateway.complete(&request).await?;
        non_blank(completion.text).ok_or(AgentError::SchemaValidation {
            agent: AGENT_NAME,
            reason: "empty reply".to_string(),
        })
    }

    fn build_turn_request(
        &self,
        state: &InterviewState,
        candidate_message: &str,
        analysis: &ObserverAnalysis,
    ) -> String {
        let mut guidance = format!(
            "## OBSERVER GUIDANCE\n\
             Response type: {kind:?}. Answered the active question: {answered}.\n\
             Recommendation: {recommendation}\n\
             Current difficulty: {difficulty} (ask your next question at this level).\n",
            kind = analysis.kind,
            answered = analysis.answered_last_question,
            recommendation = analysis.recommendation,
            difficulty = state.current_difficulty.as_str(),
        );

        if analysis.is_gibberish {
            guidance.push_str(
                "The message was gibberish. Say it did not come through and repeat your open question.\n",
            );
        } else if analysis.kind == ResponseKind::CounterQuestion
            && let Some(question) = state.active_question()
        {
            guidance.push_str(&format!(
                "Answer their question briefly, then return to your open question: {question}\n"
            ));
        }
        if let Some(correction) = &analysis.correct_answer {
            guidance.push_str(&format!(
                "The candidate stated something false. Correct fact: {correction}\n"
            ));
        }
        if let Some(name) = &state.candidate.name {
            guidance.push_str(&format!("Candidate name: {name}.\n"));
        }
        if !state.candidate.technologies.is_empty() {
            guidance.push_str(&format!(
                "Known technologies: {}.\n",
                state.candidate.technologies.join(", ")
            ));
        }
        guidance.push_str(&job_description_block(state));

        format!(
            "{guidance}\n## CANDIDATE MESSAGE\n<user_input>\n{candidate_message}\n</user_input>\n\n\
             Write your reply to the candidate."
        )
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
