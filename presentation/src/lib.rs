//! Presentation layer for streamchat
//!
//! This crate contains CLI definitions, the terminal transcript view,
//! progress indicators, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand, run_prompt};
pub use cli::commands::{Cli, Command};
pub use output::console::{ConsoleTranscript, control_hint, set_color};
pub use progress::spinner::RequestSpinner;
