//! Terminal interview feedback.
//!
//! Produced exactly once per session by the evaluator agent, from the
//! transcript and the accumulated state only. Immutable thereafter.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Grade the evaluator assessed from the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessedGrade {
    Intern,
    Junior,
    Middle,
    Senior,
    Lead,
}

impl AssessedGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessedGrade::Intern => "Intern",
            AssessedGrade::Junior => "Junior",
            AssessedGrade::Middle => "Middle",
            AssessedGrade::Senior => "Senior",
            AssessedGrade::Lead => "Lead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HiringRecommendation {
    #[serde(rename = "Strong Hire")]
    StrongHire,
    Hire,
    #[serde(rename = "No Hire")]
    NoHire,
}

impl HiringRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            HiringRecommendation::StrongHire => "Strong Hire",
            HiringRecommendation::Hire => "Hire",
            HiringRecommendation::NoHire => "No Hire",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClarityLevel {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ClarityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClarityLevel::Excellent => "Excellent",
            ClarityLevel::Good => "Good",
            ClarityLevel::Average => "Average",
            ClarityLevel::Poor => "Poor",
        }
    }
}

/// The headline verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub grade: AssessedGrade,
    pub hiring_recommendation: HiringRecommendation,
    /// Confidence in the verdict, 0-100.
    pub confidence_score: u8,
}

/// Assessment of one skill or gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub topic: String,
    pub is_confirmed: bool,
    pub details: String,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicalReview {
    #[serde(default)]
    pub confirmed_skills: Vec<SkillAssessment>,
    #[serde(default)]
    pub knowledge_gaps: Vec<SkillAssessment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftSkillsReview {
    pub clarity: ClarityLevel,
    pub clarity_details: String,
    pub honesty: String,
    pub honesty_details: String,
    pub engagement: String,
    pub engagement_details: String,
}

/// One prioritized study topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub topic: String,
    /// 1 (most urgent) to 5.
    pub priority: u8,
    pub reason: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRoadmap {
    #[serde(default)]
    pub items: Vec<RoadmapItem>,
    pub summary: String,
}

/// Complete terminal feedback for one interview session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub verdict: Verdict,
    pub technical_review: TechnicalReview,
    pub soft_skills_review: SoftSkillsReview,
    pub roadmap: PersonalRoadmap,
    pub general_comments: String,
}

impl InterviewFeedback {
    /// Range-check the numeric fields the backend filled in. Used as the
    /// schema-validation backstop after deserialization.
    pub fn validate(&self) -> Result<(), String> {
        if self.verdict.confidence_score > 100 {
            return Err(format!(
                "confidence_score out of range: {}",
                self.verdict.confidence_score
            ));
        }
        for item in &self.roadmap.items {
            if !(1..=5).contains(&item.priority) {
                return Err(format!(
                    "roadmap priority out of range for '{}': {}",
                    item.topic, item.priority
                ));
            }
        }
        Ok(())
    }

    /// Render the feedback as a readable plain-text report.
    pub fn to_formatted_string(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);
        let sub = "-".repeat(40);

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "FINAL INTERVIEW FEEDBACK");
        let _ = writeln!(out, "{rule}\n");

        let _ = writeln!(out, "VERDICT");
        let _ = writeln!(out, "{sub}");
        let _ = writeln!(out, "Assessed grade: {}", self.verdict.grade.as_str());
        let _ = writeln!(
            out,
            "Recommendation: {}",
            self.verdict.hiring_recommendation.as_str()
        );
        let _ = writeln!(out, "Confidence: {}%\n", self.verdict.confidence_score);

        let _ = writeln!(out, "TECHNICAL SKILLS");
        let _ = writeln!(out, "{sub}");
        if self.technical_review.confirmed_skills.is_empty() {
            let _ = writeln!(out, "Confirmed skills: none recorded");
        } else {
            let _ = writeln!(out, "Confirmed skills:");
            for skill in &self.technical_review.confirmed_skills {
                let _ = writeln!(out, "  - {}: {}", skill.topic, skill.details);
            }
        }
        if self.technical_review.knowledge_gaps.is_empty() {
            let _ = writeln!(out, "Knowledge gaps: none detected");
        } else {
            let _ = writeln!(out, "Knowledge gaps:");
            for gap in &self.technical_review.knowledge_gaps {
                let _ = writeln!(out, "  - {}: {}", gap.topic, gap.details);
                if let Some(correct) = &gap.correct_answer {
                    let _ = writeln!(out, "    Correct answer: {correct}");
                }
            }
        }

        let _ = writeln!(out, "\nSOFT SKILLS");
        let _ = writeln!(out, "{sub}");
        let _ = writeln!(
            out,
            "Clarity: {}\n  {}",
            self.soft_skills_review.clarity.as_str(),
            self.soft_skills_review.clarity_details
        );
        let _ = writeln!(
            out,
            "Honesty: {}\n  {}",
            self.soft_skills_review.honesty, self.soft_skills_review.honesty_details
        );
        let _ = writeln!(
            out,
            "Engagement: {}\n  {}",
            self.soft_skills_review.engagement, self.soft_skills_review.engagement_details
        );

        let _ = writeln!(out, "\nPERSONAL ROADMAP");
        let _ = writeln!(out, "{sub}");
        let _ = writeln!(out, "{}", self.roadmap.summary);
        let mut items: Vec<&RoadmapItem> = self.roadmap.items.iter().collect();
        items.sort_by_key(|i| i.priority);
        for item in items {
            let _ = writeln!(out, "[Priority {}] {}", item.priority, item.topic);
            let _ = writeln!(out, "  Reason: {}", item.reason);
            if !item.resources.is_empty() {
                let _ = writeln!(out, "  Resources: {}", item.resources.join(", "));
            }
        }

        let _ = writeln!(out, "\nGENERAL COMMENTS");
        let _ = writeln!(out, "{sub}");
        let _ = writeln!(out, "{}", self.general_comments);
        let _ = writeln!(out, "{rule}");
        out
    }
}
