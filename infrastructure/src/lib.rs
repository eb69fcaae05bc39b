//! Infrastructure layer for streamchat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: generation engines, the event stream codec,
//! the HTTP server and client, reply persistence, and configuration file
//! loading.

pub mod config;
pub mod engines;
pub mod http;
pub mod loopback;
pub mod persistence;
pub mod sse;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use engines::{
    EngineKind, EngineSet, OllamaSettings, OllamaSource, ScriptedSettings, ScriptedSource,
    SourceRouter, build_engines,
};
pub use http::{AppState, HttpStreamTransport};
pub use loopback::LoopbackTransport;
pub use persistence::JsonlTranscriptStore;
pub use sse::{SseDecoder, decode_event_stream, encode_frame, encode_payload};
