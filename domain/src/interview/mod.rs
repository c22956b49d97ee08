//! Interview data model and pure decision logic.
//!
//! The modules here hold everything a session mutates: the candidate
//! profile, the turn history, the observer's per-reply analysis, the
//! difficulty controller, and the terminal feedback structure.

pub mod analysis;
pub mod candidate;
pub mod difficulty;
pub mod feedback;
pub mod state;
pub mod turn;
