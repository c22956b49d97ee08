//! Adaptive question difficulty.
//!
//! Difficulty moves one level after two consecutive same-direction signals,
//! clamped at both ends. The controller is a pure function over the streak
//! counters; the caller is responsible for never invoking it when the
//! active question was not answered (the observer forces both signals false
//! in that case, making the call a structural no-op).

use super::analysis::ObserverAnalysis;
use serde::{Deserialize, Serialize};

/// Consecutive signals required before difficulty moves one level.
pub const STREAK_THRESHOLD: u32 = 2;

/// Question difficulty, totally ordered and clamped at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyLevel {
    Basic,
    Intermediate,
    Advanced,
    Expert,
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel::Basic
    }
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Basic => "BASIC",
            DifficultyLevel::Intermediate => "INTERMEDIATE",
            DifficultyLevel::Advanced => "ADVANCED",
            DifficultyLevel::Expert => "EXPERT",
        }
    }

    /// One level harder, clamped at `Expert`.
    pub fn raised(&self) -> Self {
        match self {
            DifficultyLevel::Basic => DifficultyLevel::Intermediate,
            DifficultyLevel::Intermediate => DifficultyLevel::Advanced,
            DifficultyLevel::Advanced | DifficultyLevel::Expert => DifficultyLevel::Expert,
        }
    }

    /// One level easier, clamped at `Basic`.
    pub fn lowered(&self) -> Self {
        match self {
            DifficultyLevel::Expert => DifficultyLevel::Advanced,
            DifficultyLevel::Advanced => DifficultyLevel::Intermediate,
            DifficultyLevel::Intermediate | DifficultyLevel::Basic => DifficultyLevel::Basic,
        }
    }
}

/// Compute the next `(difficulty, good_streak, bad_streak)` from an analysis.
///
/// - increase signal: good streak +1, bad streak reset; at the threshold the
///   level rises one step (clamped) and the good streak resets to 0.
/// - simplify signal: symmetric, toward `Basic`.
/// - neither signal: both streaks reset (no drift across mixed answers).
pub fn adjust_difficulty(
    level: DifficultyLevel,
    good_streak: u32,
    bad_streak: u32,
    analysis: &ObserverAnalysis,
) -> (DifficultyLevel, u32, u32) {
    if analysis.should_increase_difficulty {
        let good = good_streak + 1;
        if good >= STREAK_THRESHOLD {
            (level.raised(), 0, 0)
        } else {
            (level, good, 0)
        }
    } else if analysis.should_simplify {
        let bad = bad_streak + 1;
        if bad >= STREAK_THRESHOLD {
            (level.lowered(), 0, 0)
        } else {
            (level, 0, bad)
        }
    } else {
        (level, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::analysis::{AnswerQuality, ResponseKind};

    fn analysis(increase: bool, simplify: bool) -> ObserverAnalysis {
        ObserverAnalysis {
            kind: ResponseKind::Normal,
            quality: AnswerQuality::Acceptable,
            is_factually_correct: true,
            is_gibberish: false,
            answered_last_question: true,
            detected_topics: vec![],
            recommendation: String::new(),
            should_simplify: simplify,
            should_increase_difficulty: increase,
            correct_answer: None,
            extracted_info: None,
            demonstrated_level: None,
            thoughts: vec![],
        }
    }

    #[test]
    fn ordering_is_total() {
        assert!(DifficultyLevel::Basic < DifficultyLevel::Intermediate);
        assert!(DifficultyLevel::Advanced < DifficultyLevel::Expert);
    }

    #[test]
    fn two_good_answers_raise_one_level() {
        let a = analysis(true, false);
        let (level, good, bad) = adjust_difficulty(DifficultyLevel::Basic, 0, 0, &a);
        assert_eq!((level, good, bad), (DifficultyLevel::Basic, 1, 0));

        let (level, good, bad) = adjust_difficulty(level, good, bad, &a);
        assert_eq!((level, good, bad), (DifficultyLevel::Intermediate, 0, 0));
    }

    #[test]
    fn third_good_streak_step_reaches_advanced() {
        let a = analysis(true, false);
        let mut state = (DifficultyLevel::Basic, 0u32, 0u32);
        for _ in 0..4 {
            state = adjust_difficulty(state.0, state.1, state.2, &a);
        }
        assert_eq!(state.0, DifficultyLevel::Advanced);
    }

    #[test]
    fn clamped_at_expert() {
        let a = analysis(true, false);
        let mut state = (DifficultyLevel::Expert, 1u32, 0u32);
        state = adjust_difficulty(state.0, state.1, state.2, &a);
        assert_eq!(state.0, DifficultyLevel::Expert);
        assert_eq!(state.1, 0);
    }

    #[test]
    fn clamped_at_basic() {
        let a = analysis(false, true);
        let (level, _, _) = adjust_difficulty(DifficultyLevel::Basic, 0, 1, &a);
        assert_eq!(level, DifficultyLevel::Basic);
    }

    #[test]
    fn opposite_signal_resets_other_streak() {
        let good_run = analysis(true, false);
        let bad_run = analysis(false, true);

        let (level, good, bad) = adjust_difficulty(DifficultyLevel::Intermediate, 0, 0, &good_run);
        assert_eq!((good, bad), (1, 0));
        let (_, good, bad) = adjust_difficulty(level, good, bad, &bad_run);
        assert_eq!((good, bad), (0, 1));
    }

    #[test]
    fn no_signal_resets_both_streaks() {
        let neutral = analysis(false, false);
        let (level, good, bad) = adjust_difficulty(DifficultyLevel::Advanced, 1, 1, &neutral);
        assert_eq!((level, good, bad), (DifficultyLevel::Advanced, 0, 0));
    }
}
