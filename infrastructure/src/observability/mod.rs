//! Observability adapters.

mod tracing_tracker;

pub use tracing_tracker::TracingInterviewTracker;
