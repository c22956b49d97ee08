//! Domain layer for interview-coach
//!
//! This crate contains the interview data model and the pure decision logic
//! that drives a session: response classification, difficulty adjustment,
//! candidate-info merging, and structured-payload extraction from free-form
//! LLM output. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Active question
//!
//! The most recent interviewer-visible message the candidate has not yet
//! resolved. Off-topic replies, counter-questions, and gibberish never close
//! it; the interviewer keeps returning to it until the candidate answers or
//! stops the session.
//!
//! ## Streaks
//!
//! Consecutive same-direction quality signals. Two in a row move the
//! difficulty one level, clamped at both ends of
//! [`DifficultyLevel`](interview::difficulty::DifficultyLevel).

pub mod core;
pub mod extraction;
pub mod interview;
pub mod message;
pub mod util;

// Re-export commonly used types
pub use core::error::DomainError;
pub use extraction::{ExtractionError, extract_json_payload, extract_reasoning};
pub use interview::{
    analysis::{AnswerQuality, ObserverAnalysis, ResponseKind, resolve_answered},
    candidate::{CandidateInfo, ExtractedCandidateInfo, GradeLevel},
    difficulty::{DifficultyLevel, adjust_difficulty},
    feedback::{
        AssessedGrade, ClarityLevel, HiringRecommendation, InterviewFeedback, PersonalRoadmap,
        RoadmapItem, SkillAssessment, SoftSkillsReview, TechnicalReview, Verdict,
    },
    state::{InterviewState, KnowledgeGap},
    turn::{AgentThought, InterviewTurn},
};
pub use message::{Message, Role};
pub use util::truncate_str;
