//! Session lifecycle: per-turn orchestration and the multi-session store.

pub mod orchestrator;
pub mod store;
