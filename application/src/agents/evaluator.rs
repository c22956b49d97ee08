//! Evaluator agent: produces the terminal feedback, once per session.

use std::fmt::Write as _;
use std::sync::Arc;

use coach_domain::{InterviewFeedback, InterviewState};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{AgentParams, InterviewConfig};
use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest};

use super::prompts::EVALUATOR_SYSTEM_PROMPT;
use super::{build_messages, job_description_block, AgentError};

const AGENT_NAME: &str = "Evaluator";

pub struct EvaluatorAgent {
    gateway: Arc<dyn CompletionGateway>,
    model: String,
    params: AgentParams,
}

impl EvaluatorAgent {
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: &InterviewConfig) -> Self {
        Self {
            gateway,
            model: config.model.clone(),
            params: config.agents.evaluator,
        }
    }

    /// Evaluate the whole session. The full transcript goes into the
    /// context; no history window applies here.
    pub async fn evaluate(
        &self,
        session_id: &str,
        state: &InterviewState,
    ) -> Result<InterviewFeedback, AgentError> {
        let content = self.build_evaluation_request(state);
        let messages = build_messages(EVALUATOR_SYSTEM_PROMPT, &[], content);
        let request = CompletionRequest::new(session_id, "final_feedback", &self.model, messages)
            .with_sampling(self.params.temperature, self.params.max_tokens);

        let attempts = self.params.generation_retries + 1;
        for attempt in 1..=attempts {
            let completion = self.gateway.complete_structured(&request).await?;
            match parse_feedback(completion.payload) {
                Ok(feedback) => {
                    debug!(session_id, attempt, "final feedback parsed");
                    return Ok(feedback);
                }
                Err(reason) => {
                    warn!(session_id, attempt, reason, "evaluator payload rejected");
                }
            }
        }

        Err(AgentError::RetriesExhausted {
            agent: AGENT_NAME,
            attempts,
        })
    }

    fn build_evaluation_request(&self, state: &InterviewState) -> String {
        let mut request = String::from("# INTERVIEW RECORD\n\n## CANDIDATE\n");
        let candidate = &state.candidate;
        let _ = writeln!(
            request,
            "Name: {name}\nPosition: {position}\nTarget grade: {grade}\nExperience: {experience}\nTechnologies: {technologies}",
            name = candidate.name.as_deref().unwrap_or("(not given)"),
            position = candidate.position.as_deref().unwrap_or("(not given)"),
            grade = candidate
                .target_grade
                .map(|g| g.as_str())
                .unwrap_or("(not given)"),
            experience = candidate.experience.as_deref().unwrap_or("(not given)"),
            technologies = if candidate.technologies.is_empty() {
                "(none)".to_string()
            } else {
                candidate.technologies.join(", ")
            },
        );

        let _ = writeln!(
            request,
            "\n## OBSERVATIONS\nCompleted turns: {turns}\nFinal difficulty: {difficulty}\nCovered topics: {topics}\nConfirmed skills: {skills}",
            turns = state.completed_turns,
            difficulty = state.current_difficulty.as_str(),
            topics = state.covered_topics.join(", "),
            skills = state.confirmed_skills.join(", "),
        );

        if !state.knowledge_gaps.is_empty() {
            request.push_str("\n## KNOWLEDGE GAPS (including hallucinations)\n");
            for gap in &state.knowledge_gaps {
                let _ = writeln!(
                    request,
                    "- {topic}: candidate said \"{answer}\"{correction}",
                    topic = gap.topic,
                    answer = gap.candidate_answer,
                    correction = gap
                        .correct_answer
                        .as_deref()
                        .map(|c| format!(" (correct: {c})"))
                        .unwrap_or_default(),
                );
            }
        }

        request.push_str(&job_description_block(state));

        request.push_str("\n## TRANSCRIPT\n");
        for turn in &state.turns {
            let _ = writeln!(request, "Interviewer: {}", turn.interviewer_message);
            if let Some(answer) = &turn.candidate_message {
                let _ = writeln!(request, "Candidate: {answer}");
            }
        }

        request.push_str("\nProduce the final structured feedback.");
        request
    }
}

fn parse_feedback(payload: serde_json::Map<String, Value>) -> Result<InterviewFeedback, String> {
    let feedback: InterviewFeedback =
        serde_json::from_value(Value::Object(payload)).map_err(|e| e.to_string())?;
    feedback.validate()?;
    Ok(feedback)
}
