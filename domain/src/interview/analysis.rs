//! Observer classification of a candidate reply.
//!
//! [`ObserverAnalysis`] is the structured verdict the observer agent must
//! produce for every candidate message. The `answered_last_question` flag is
//! authoritative: it gates difficulty movement and decides whether the
//! active question stays open.

use super::candidate::ExtractedCandidateInfo;
use super::turn::AgentThought;
use serde::{Deserialize, Serialize};

/// Classification of a candidate reply against the active question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Normal,
    Hallucination,
    OffTopic,
    /// A question back at the interviewer instead of an answer.
    /// The wire value "question" (older prompt revisions) is accepted too.
    #[serde(alias = "question")]
    CounterQuestion,
    StopCommand,
    Introduction,
    Incomplete,
    Excellent,
}

impl ResponseKind {
    /// Policy-table default for `answered_last_question` when the backend
    /// did not return an explicit boolean: replies that sidestep the
    /// question leave it open, everything else closes it.
    pub fn answers_by_default(&self) -> bool {
        !matches!(
            self,
            ResponseKind::OffTopic | ResponseKind::CounterQuestion | ResponseKind::StopCommand
        )
    }
}

/// Quality tier of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerQuality {
    Wrong,
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl AnswerQuality {
    /// Quality tiers that confirm a skill when the answer is also
    /// factually correct.
    pub fn confirms_skill(&self) -> bool {
        matches!(self, AnswerQuality::Good | AnswerQuality::Excellent)
    }
}

/// Resolve `answered_last_question` with fixed precedence:
///
/// 1. Gibberish forces `false`, unconditionally.
/// 2. Otherwise an explicit backend boolean is used as-is.
/// 3. Otherwise the policy table keyed by [`ResponseKind`] applies.
///
/// The ordering is load-bearing: reordering changes termination and
/// difficulty behavior.
pub fn resolve_answered(
    is_gibberish: bool,
    explicit: Option<bool>,
    kind: ResponseKind,
) -> bool {
    if is_gibberish {
        return false;
    }
    match explicit {
        Some(answered) => answered,
        None => kind.answers_by_default(),
    }
}

/// The observer's structured verdict on one candidate reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverAnalysis {
    pub kind: ResponseKind,
    pub quality: AnswerQuality,
    pub is_factually_correct: bool,
    pub is_gibberish: bool,
    /// Whether the reply closed the active question. Already resolved via
    /// [`resolve_answered`]; never read raw backend output for this.
    pub answered_last_question: bool,
    pub detected_topics: Vec<String>,
    /// Directive for the interviewer's next step.
    pub recommendation: String,
    pub should_simplify: bool,
    pub should_increase_difficulty: bool,
    /// Correction text when the candidate stated something false.
    pub correct_answer: Option<String>,
    pub extracted_info: Option<ExtractedCandidateInfo>,
    pub demonstrated_level: Option<String>,
    pub thoughts: Vec<AgentThought>,
}

impl ObserverAnalysis {
    /// Enforce the difficulty invariant: when the active question was not
    /// resolved, neither difficulty signal may fire, regardless of what the
    /// backend claimed.
    pub fn enforce_invariants(&mut self) {
        if !self.answered_last_question {
            self.should_simplify = false;
            self.should_increase_difficulty = false;
        }
    }
}
