//! Interactive chat module
//!
//! Provides a readline-based chat interface and the single-prompt runner
//! used by `ask`.

mod repl;
mod session;

pub use repl::{ChatRepl, ReplCommand};
pub use session::run_prompt;
