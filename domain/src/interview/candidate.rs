//! Candidate profile and the idempotent merge of extracted fragments.
//!
//! The observer agent extracts partial candidate information from free-form
//! replies. Fragments are merged into [`CandidateInfo`] with fill-only
//! semantics: a field set once is never overwritten or cleared by emptier
//! data, so repeating a merge is always safe.

use super::difficulty::DifficultyLevel;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Seniority grade a candidate targets (or demonstrates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeLevel {
    Intern,
    Junior,
    Middle,
    Senior,
    Lead,
}

impl GradeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLevel::Intern => "Intern",
            GradeLevel::Junior => "Junior",
            GradeLevel::Middle => "Middle",
            GradeLevel::Senior => "Senior",
            GradeLevel::Lead => "Lead",
        }
    }

    /// Starting question difficulty for a candidate targeting this grade.
    pub fn initial_difficulty(&self) -> DifficultyLevel {
        match self {
            GradeLevel::Intern | GradeLevel::Junior => DifficultyLevel::Basic,
            GradeLevel::Middle => DifficultyLevel::Intermediate,
            GradeLevel::Senior => DifficultyLevel::Advanced,
            GradeLevel::Lead => DifficultyLevel::Expert,
        }
    }
}

impl FromStr for GradeLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intern" => Ok(GradeLevel::Intern),
            "junior" => Ok(GradeLevel::Junior),
            "middle" | "mid" => Ok(GradeLevel::Middle),
            "senior" => Ok(GradeLevel::Senior),
            "lead" => Ok(GradeLevel::Lead),
            _ => Err(()),
        }
    }
}

/// Candidate profile accumulated over the interview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: Option<String>,
    pub position: Option<String>,
    pub target_grade: Option<GradeLevel>,
    pub experience: Option<String>,
    pub technologies: Vec<String>,
}

/// Partial candidate info extracted from one message. Best-effort: every
/// field may be absent, and the grade arrives as raw text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedCandidateInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl ExtractedCandidateInfo {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.name).is_none()
            && non_empty(&self.position).is_none()
            && non_empty(&self.grade).is_none()
            && non_empty(&self.experience).is_none()
            && !self.technologies.iter().any(|t| !t.trim().is_empty())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl CandidateInfo {
    /// Merge an extracted fragment into the profile.
    ///
    /// Fill-only: incoming non-empty fields populate unset fields,
    /// technologies are unioned without duplicates, and nothing that is
    /// already set is ever touched. Merging the same fragment twice yields
    /// the same profile as merging it once.
    ///
    /// Returns the target grade if this merge set it for the first time, so
    /// the caller can seed the initial question difficulty.
    pub fn merge(&mut self, extracted: &ExtractedCandidateInfo) -> Option<GradeLevel> {
        if self.name.is_none()
            && let Some(name) = non_empty(&extracted.name)
        {
            self.name = Some(name.to_string());
        }

        if self.position.is_none()
            && let Some(position) = non_empty(&extracted.position)
        {
            self.position = Some(position.to_string());
        }

        let mut newly_set_grade = None;
        if self.target_grade.is_none()
            && let Some(raw) = non_empty(&extracted.grade)
            && let Ok(grade) = raw.parse::<GradeLevel>()
        {
            self.target_grade = Some(grade);
            newly_set_grade = Some(grade);
        }

        if self.experience.is_none()
            && let Some(experience) = non_empty(&extracted.experience)
        {
            self.experience = Some(experience.to_string());
        }

        for tech in &extracted.technologies {
            let tech = tech.trim();
            if !tech.is_empty() && !self.technologies.iter().any(|t| t == tech) {
                self.technologies.push(tech.to_string());
            }
        }

        newly_set_grade
    }
}
