//! Presentation layer for interview-coach
//!
//! This crate contains the CLI argument definitions, the interactive chat
//! REPL, and the console feedback renderer.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::Cli;
pub use output::ConsoleRenderer;
