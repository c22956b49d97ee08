//! Colored terminal rendering of the final feedback.

use std::fmt::Write as _;

use coach_domain::{HiringRecommendation, InterviewFeedback};
use colored::Colorize;

pub struct ConsoleRenderer;

impl ConsoleRenderer {
    /// Render the full feedback report with colors.
    pub fn format_feedback(feedback: &InterviewFeedback) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);

        let _ = writeln!(out, "\n{}", rule.bright_blue());
        let _ = writeln!(out, "{}", "  INTERVIEW FEEDBACK".bright_blue().bold());
        let _ = writeln!(out, "{}", rule.bright_blue());

        let verdict = &feedback.verdict;
        let recommendation = match verdict.hiring_recommendation {
            HiringRecommendation::StrongHire => verdict.hiring_recommendation.as_str().bright_green(),
            HiringRecommendation::Hire => verdict.hiring_recommendation.as_str().green(),
            HiringRecommendation::NoHire => verdict.hiring_recommendation.as_str().red(),
        };
        let _ = writeln!(
            out,
            "\n{} {}   {} {}   {} {}%",
            "Grade:".bold(),
            verdict.grade.as_str(),
            "Recommendation:".bold(),
            recommendation.bold(),
            "Confidence:".bold(),
            verdict.confidence_score,
        );

        if !feedback.technical_review.confirmed_skills.is_empty() {
            let _ = writeln!(out, "\n{}", "Confirmed skills".green().bold());
            for skill in &feedback.technical_review.confirmed_skills {
                let _ = writeln!(out, "  {} {} - {}", "+".green(), skill.topic.bold(), skill.details);
            }
        }

        if !feedback.technical_review.knowledge_gaps.is_empty() {
            let _ = writeln!(out, "\n{}", "Knowledge gaps".yellow().bold());
            for gap in &feedback.technical_review.knowledge_gaps {
                let _ = writeln!(out, "  {} {} - {}", "-".yellow(), gap.topic.bold(), gap.details);
                if let Some(correct) = &gap.correct_answer {
                    let _ = writeln!(out, "    {} {}", "correct:".dimmed(), correct.dimmed());
                }
            }
        }

        let soft = &feedback.soft_skills_review;
        let _ = writeln!(out, "\n{}", "Soft skills".cyan().bold());
        let _ = writeln!(out, "  Clarity:    {} ({})", soft.clarity.as_str(), soft.clarity_details);
        let _ = writeln!(out, "  Honesty:    {} ({})", soft.honesty, soft.honesty_details);
        let _ = writeln!(out, "  Engagement: {} ({})", soft.engagement, soft.engagement_details);

        if !feedback.roadmap.items.is_empty() {
            let _ = writeln!(out, "\n{}", "Personal roadmap".magenta().bold());
            let mut items: Vec<_> = feedback.roadmap.items.iter().collect();
            items.sort_by_key(|item| item.priority);
            for item in items {
                let _ = writeln!(
                    out,
                    "  [{}] {} - {}",
                    item.priority,
                    item.topic.bold(),
                    item.reason
                );
                for resource in &item.resources {
                    let _ = writeln!(out, "       {} {}", "*".dimmed(), resource);
                }
            }
            let _ = writeln!(out, "  {}", feedback.roadmap.summary.italic());
        }

        if !feedback.general_comments.is_empty() {
            let _ = writeln!(out, "\n{}\n{}", "Comments".bold(), feedback.general_comments);
        }
        let _ = writeln!(out, "{}", rule.bright_blue());
        out
    }

    /// One interviewer message, prefixed for the chat transcript.
    pub fn format_interviewer_message(message: &str) -> String {
        format!("{} {}", "Interviewer:".bright_blue().bold(), message)
    }

    /// A recoverable turn failure.
    pub fn format_failure(message: &str) -> String {
        format!("{} {}", "!".yellow().bold(), message.yellow())
    }
}
