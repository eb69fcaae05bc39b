//! Reply persistence.
//!
//! Provides [`JsonlTranscriptStore`], a JSONL file writer that implements the
//! [`TranscriptStore`](streamchat_application::TranscriptStore) port.

mod jsonl_store;

pub use jsonl_store::JsonlTranscriptStore;
