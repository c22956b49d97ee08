//! Interview session state.
//!
//! One [`InterviewState`] per session, exclusively owned by the session
//! orchestrator. Agents receive read access; every mutation goes through
//! the methods here so the single-open-turn and commit-ordering rules hold.

use super::analysis::ObserverAnalysis;
use super::candidate::CandidateInfo;
use super::difficulty::DifficultyLevel;
use super::turn::{AgentThought, InterviewTurn};
use crate::core::error::DomainError;
use crate::message::Message;
use crate::util::truncate_str;
use serde::{Deserialize, Serialize};

/// Maximum bytes of the candidate's answer stored in a gap record.
const GAP_ANSWER_PREVIEW: usize = 200;

/// A recorded knowledge gap: the candidate attempted an answer and got the
/// facts wrong.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeGap {
    pub topic: String,
    pub candidate_answer: String,
    pub correct_answer: Option<String>,
}

/// Full mutable state of one interview session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewState {
    pub candidate: CandidateInfo,
    pub turns: Vec<InterviewTurn>,
    /// Number of fully committed turns. Incremented only at the commit
    /// stage of the pipeline, never on a failed or forced-stop turn.
    pub completed_turns: u32,
    pub current_difficulty: DifficultyLevel,
    pub covered_topics: Vec<String>,
    pub confirmed_skills: Vec<String>,
    pub knowledge_gaps: Vec<KnowledgeGap>,
    pub consecutive_good_answers: u32,
    pub consecutive_bad_answers: u32,
    pub job_description: Option<String>,
}

impl InterviewState {
    pub fn new(job_description: Option<String>) -> Self {
        Self {
            job_description,
            ..Default::default()
        }
    }

    /// Open a new turn with the interviewer's visible message.
    ///
    /// At most one turn may be open at a time; opening a second is a
    /// pipeline-ordering bug.
    pub fn open_turn(&mut self, interviewer_message: impl Into<String>) -> Result<(), DomainError> {
        if self.turns.last().is_some_and(|t| t.is_open()) {
            return Err(DomainError::TurnAlreadyOpen);
        }
        let turn_id = self.turns.len() as u32 + 1;
        self.turns
            .push(InterviewTurn::new(turn_id, interviewer_message));
        Ok(())
    }

    /// Write the candidate's message into the currently open turn.
    /// Memory-only; overwriting on a reprocessed message is fine.
    pub fn record_candidate_message(&mut self, message: &str) {
        if let Some(turn) = self.turns.last_mut() {
            turn.candidate_message = Some(message.to_string());
        }
    }

    /// Append private thoughts to the most recent turn.
    pub fn attach_thoughts(&mut self, thoughts: Vec<AgentThought>) {
        if let Some(turn) = self.turns.last_mut() {
            turn.thoughts.extend(thoughts);
        }
    }

    /// The active question: the latest interviewer-visible message.
    pub fn active_question(&self) -> Option<&str> {
        self.turns.last().map(|t| t.interviewer_message.as_str())
    }

    /// Role-tagged history for LLM context.
    pub fn conversation_history(&self) -> Vec<Message> {
        let mut history = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            history.push(Message::assistant(turn.interviewer_message.clone()));
            if let Some(candidate) = &turn.candidate_message {
                history.push(Message::user(candidate.clone()));
            }
        }
        history
    }

    /// Commit-stage merge of analysis results into the accumulated record.
    ///
    /// Called only after the interviewer reply was produced, so a partial
    /// failure can never leave topics/skills/gaps advanced without the
    /// corresponding visible reply.
    ///
    /// - covered topics: always unioned.
    /// - confirmed skills: only when the candidate answered, correctly and
    ///   at good-or-better quality.
    /// - knowledge gaps: only when the candidate *attempted* an answer and
    ///   got it factually wrong. Gibberish, off-topic replies, and counter
    ///   questions do not demonstrate ignorance and record nothing.
    pub fn absorb_analysis(&mut self, analysis: &ObserverAnalysis, candidate_message: &str) {
        for topic in &analysis.detected_topics {
            if !self.covered_topics.iter().any(|t| t == topic) {
                self.covered_topics.push(topic.clone());
            }
        }

        if !analysis.answered_last_question {
            return;
        }

        if analysis.quality.confirms_skill() && analysis.is_factually_correct {
            for topic in &analysis.detected_topics {
                if !self.confirmed_skills.iter().any(|t| t == topic) {
                    self.confirmed_skills.push(topic.clone());
                }
            }
        }

        if !analysis.is_factually_correct
            || analysis.quality == super::analysis::AnswerQuality::Wrong
        {
            let topic = if analysis.detected_topics.is_empty() {
                "General knowledge".to_string()
            } else {
                analysis.detected_topics.join(", ")
            };
            self.knowledge_gaps.push(KnowledgeGap {
                topic,
                candidate_answer: truncate_str(candidate_message, GAP_ANSWER_PREVIEW).to_string(),
                correct_answer: analysis.correct_answer.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::analysis::{AnswerQuality, ResponseKind};

    fn analysis() -> ObserverAnalysis {
        ObserverAnalysis {
            kind: ResponseKind::Normal,
            quality: AnswerQuality::Good,
            is_factually_correct: true,
            is_gibberish: false,
            answered_last_question: true,
            detected_topics: vec!["Python".to_string(), "GIL".to_string()],
            recommendation: String::new(),
            should_simplify: false,
            should_increase_difficulty: false,
            correct_answer: None,
            extracted_info: None,
            demonstrated_level: None,
            thoughts: vec![],
        }
    }

    #[test]
    fn at_most_one_open_turn() {
        let mut state = InterviewState::default();
        state.open_turn("Q1").unwrap();
        assert!(matches!(
            state.open_turn("Q2"),
            Err(DomainError::TurnAlreadyOpen)
        ));

        state.record_candidate_message("A1");
        state.open_turn("Q2").unwrap();
        assert_eq!(state.turns.len(), 2);
        assert_eq!(state.turns[1].turn_id, 2);
    }

    #[test]
    fn active_question_tracks_latest_turn() {
        let mut state = InterviewState::default();
        assert!(state.active_question().is_none());
        state.open_turn("Q1").unwrap();
        assert_eq!(state.active_question(), Some("Q1"));
    }

    #[test]
    fn history_interleaves_roles() {
        let mut state = InterviewState::default();
        state.open_turn("Q1").unwrap();
        state.record_candidate_message("A1");
        state.open_turn("Q2").unwrap();

        let history = state.conversation_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "Q1");
        assert_eq!(history[1].content, "A1");
        assert_eq!(history[2].content, "Q2");
    }

    #[test]
    fn good_correct_answer_confirms_skills() {
        let mut state = InterviewState::default();
        state.absorb_analysis(&analysis(), "answer");
        assert_eq!(state.covered_topics, vec!["Python", "GIL"]);
        assert_eq!(state.confirmed_skills, vec!["Python", "GIL"]);
        assert!(state.knowledge_gaps.is_empty());
    }

    #[test]
    fn absorb_is_duplicate_free() {
        let mut state = InterviewState::default();
        state.absorb_analysis(&analysis(), "answer");
        state.absorb_analysis(&analysis(), "answer");
        assert_eq!(state.covered_topics.len(), 2);
        assert_eq!(state.confirmed_skills.len(), 2);
    }

    #[test]
    fn wrong_answer_records_gap() {
        let mut state = InterviewState::default();
        let mut a = analysis();
        a.is_factually_correct = false;
        a.quality = AnswerQuality::Wrong;
        a.correct_answer = Some("There is no Python 4.0.".to_string());

        state.absorb_analysis(&a, "Python 4.0 removed the GIL");
        assert_eq!(state.knowledge_gaps.len(), 1);
        assert_eq!(state.knowledge_gaps[0].topic, "Python, GIL");
        assert!(state.confirmed_skills.is_empty());
    }

    #[test]
    fn unanswered_reply_only_adds_topics() {
        let mut state = InterviewState::default();
        let mut a = analysis();
        a.answered_last_question = false;
        a.is_factually_correct = false;
        a.quality = AnswerQuality::Wrong;

        state.absorb_analysis(&a, "what about the weather?");
        assert_eq!(state.covered_topics.len(), 2);
        assert!(state.confirmed_skills.is_empty());
        assert!(state.knowledge_gaps.is_empty());
    }

    #[test]
    fn gap_topic_falls_back_to_general() {
        let mut state = InterviewState::default();
        let mut a = analysis();
        a.detected_topics.clear();
        a.is_factually_correct = false;

        state.absorb_analysis(&a, "wrong stuff");
        assert_eq!(state.knowledge_gaps[0].topic, "General knowledge");
    }
}
