//! Domain layer for streamchat
//!
//! This crate contains the core entities and value objects of the streaming
//! chat pipeline. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Stream
//!
//! A generation reply travels as a sequence of [`StreamEvent`]s: text
//! fragments followed by exactly one terminal event (`Done` or `Error`).
//!
//! ## Fragment Queue
//!
//! The client buffers decoded fragments in a [`FragmentQueue`] of display
//! units, revealed one per animation tick.
//!
//! ## Session
//!
//! Each conversation has at most one generation in flight, tracked by a
//! [`SessionState`] machine.

pub mod config;
pub mod conversation;
pub mod core;
pub mod session;
pub mod stream;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use conversation::{
    conversation_id::ConversationId,
    message::{ChatMessage, Role},
    request::{EngineSelection, GenerationRequest},
};
pub use core::error::DomainError;
pub use session::{
    composer::{ComposerView, SendControl},
    state::{SessionOutcome, SessionState},
};
pub use stream::{
    event::{Fragment, StreamEvent},
    queue::FragmentQueue,
};
