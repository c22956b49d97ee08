//! Tracker backed by `tracing` plus an in-memory metrics map.
//!
//! Spans and generations are emitted as structured log events; token usage
//! is aggregated per session so the orchestrator can print a summary at
//! termination. Everything is best-effort, a poisoned lock just drops the
//! datapoint.

use std::collections::HashMap;
use std::sync::Mutex;

use coach_application::{InterviewTracker, SessionMetrics, TokenUsage};
use serde_json::Value;
use tracing::{debug, info};

#[derive(Default)]
pub struct TracingInterviewTracker {
    metrics: Mutex<HashMap<String, SessionMetrics>>,
}

impl TracingInterviewTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InterviewTracker for TracingInterviewTracker {
    fn start_trace(&self, session_id: &str) {
        info!(session_id, "trace started");
    }

    fn add_span(&self, session_id: &str, name: &str, attributes: Value) {
        debug!(session_id, span = name, %attributes, "span");
    }

    fn record_generation(&self, session_id: &str, generation_name: &str, usage: TokenUsage) {
        debug!(
            session_id,
            generation = generation_name,
            input = usage.input,
            output = usage.output,
            "generation recorded"
        );
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics
                .entry(session_id.to_string())
                .or_default()
                .record(generation_name, usage);
        }
    }

    // The orchestrator reads session_metrics before finalizing, so the
    // entry can be dropped here without losing the terminal summary.
    fn finalize_trace(&self, session_id: &str) {
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.remove(session_id);
        }
        info!(session_id, "trace finalized");
    }

    fn session_metrics(&self, session_id: &str) -> Option<SessionMetrics> {
        self.metrics
            .lock()
            .ok()
            .and_then(|metrics| metrics.get(session_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_accumulate_per_session() {
        let tracker = TracingInterviewTracker::new();
        let usage = TokenUsage {
            input: 5,
            output: 7,
            total: 12,
        };
        tracker.record_generation("a", "greeting", usage);
        tracker.record_generation("a", "observer_analysis", usage);
        tracker.record_generation("b", "greeting", usage);

        let a = tracker.session_metrics("a").unwrap();
        assert_eq!(a.generations, 2);
        assert_eq!(a.usage.total, 24);
        let b = tracker.session_metrics("b").unwrap();
        assert_eq!(b.generations, 1);
        assert!(tracker.session_metrics("c").is_none());
    }

    #[test]
    fn finalize_drops_the_session_entry() {
        let tracker = TracingInterviewTracker::new();
        let usage = TokenUsage {
            input: 5,
            output: 7,
            total: 12,
        };
        tracker.record_generation("a", "greeting", usage);
        tracker.record_generation("b", "greeting", usage);

        tracker.finalize_trace("a");
        assert!(tracker.session_metrics("a").is_none());
        // other sessions keep accumulating
        assert!(tracker.session_metrics("b").is_some());
    }
}
