//! Interactive chat surface.

mod repl;

pub use repl::ChatRepl;
