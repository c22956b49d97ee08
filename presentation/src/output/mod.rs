//! Console output formatting.

mod console;

pub use console::ConsoleRenderer;
