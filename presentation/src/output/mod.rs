//! Terminal output

pub mod console;

pub use console::{ConsoleTranscript, control_hint, set_color};
