//! Observability port.
//!
//! The orchestrator reports traces, per-stage spans, and per-generation
//! token usage through this port. Everything here is best-effort and
//! fire-and-forget: the methods are synchronous and infallible, and an
//! implementation must never let a reporting problem abort the interview
//! pipeline.

use super::completion_gateway::TokenUsage;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Aggregated token metrics for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionMetrics {
    pub generations: u64,
    pub usage: TokenUsage,
    /// Usage broken down by generation name.
    pub per_generation: BTreeMap<String, TokenUsage>,
}

impl SessionMetrics {
    pub fn record(&mut self, generation_name: &str, usage: TokenUsage) {
        self.generations += 1;
        self.usage.merge(usage);
        self.per_generation
            .entry(generation_name.to_string())
            .or_default()
            .merge(usage);
    }

    /// Compact multi-line summary for the terminal log.
    pub fn to_summary_string(&self) -> String {
        let mut out = format!(
            "Token usage: {} generations, {} input / {} output / {} total",
            self.generations, self.usage.input, self.usage.output, self.usage.total
        );
        for (name, usage) in &self.per_generation {
            let _ = write!(out, "\n  {name}: {} total", usage.total);
        }
        out
    }
}

/// Port for the observability collaborator.
pub trait InterviewTracker: Send + Sync {
    /// Begin a trace for a new session.
    fn start_trace(&self, session_id: &str);

    /// Record a named span after a pipeline stage.
    fn add_span(&self, session_id: &str, name: &str, attributes: Value);

    /// Record token usage for one completion, tagged by generation name.
    fn record_generation(&self, session_id: &str, generation_name: &str, usage: TokenUsage);

    /// Close out the trace at session termination.
    fn finalize_trace(&self, session_id: &str);

    /// Aggregated metrics for the session, if any were recorded.
    fn session_metrics(&self, session_id: &str) -> Option<SessionMetrics>;
}

/// No-op tracker for tests and when observability is disabled.
pub struct NoInterviewTracker;

impl InterviewTracker for NoInterviewTracker {
    fn start_trace(&self, _session_id: &str) {}
    fn add_span(&self, _session_id: &str, _name: &str, _attributes: Value) {}
    fn record_generation(&self, _session_id: &str, _generation_name: &str, _usage: TokenUsage) {}
    fn finalize_trace(&self, _session_id: &str) {}
    fn session_metrics(&self, _session_id: &str) -> Option<SessionMetrics> {
        None
    }
}
