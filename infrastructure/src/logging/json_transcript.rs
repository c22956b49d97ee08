//! JSON file writer for interview transcripts.
//!
//! Two files per terminated session, named by a shared timestamp:
//! `interview_<ts>.json` holds the compact turn-by-turn record,
//! `interview_<ts>_detailed.json` the full structured state plus token
//! metrics.

use std::fs;
use std::path::{Path, PathBuf};

use coach_application::{SessionMetrics, TranscriptError, TranscriptStore};
use coach_domain::{InterviewFeedback, InterviewState};
use serde_json::json;
use tracing::debug;

pub struct JsonTranscriptStore {
    dir: PathBuf,
}

impl JsonTranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn timestamp() -> String {
        chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
    }

    fn write(&self, filename: &str, value: &serde_json::Value) -> Result<PathBuf, TranscriptError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        debug!(path = %path.display(), "transcript written");
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TranscriptStore for JsonTranscriptStore {
    fn save_summary(
        &self,
        state: &InterviewState,
        feedback: &InterviewFeedback,
    ) -> Result<PathBuf, TranscriptError> {
        let record = json!({
            "candidate": state.candidate,
            "completed_turns": state.completed_turns,
            "final_difficulty": state.current_difficulty,
            "turns": state.turns.iter().map(|t| t.to_log_record()).collect::<Vec<_>>(),
            "feedback": feedback.to_formatted_string(),
        });
        self.write(&format!("interview_{}.json", Self::timestamp()), &record)
    }

    fn save_detailed(
        &self,
        state: &InterviewState,
        feedback: &InterviewFeedback,
        metrics: Option<&SessionMetrics>,
    ) -> Result<PathBuf, TranscriptError> {
        let metrics = metrics.map(|m| {
            json!({
                "generations": m.generations,
                "input_tokens": m.usage.input,
                "output_tokens": m.usage.output,
                "total_tokens": m.usage.total,
                "per_generation": m.per_generation.iter()
                    .map(|(name, usage)| (name.clone(), json!({
                        "input": usage.input,
                        "output": usage.output,
                        "total": usage.total,
                    })))
                    .collect::<serde_json::Map<_, _>>(),
            })
        });
        let record = json!({
            "state": state,
            "feedback": feedback,
            "metrics": metrics,
        });
        self.write(
            &format!("interview_{}_detailed.json", Self::timestamp()),
            &record,
        )
    }
}
