//! Application layer for streamchat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AnimationParams, StreamParams};
pub use ports::{
    fragment_source::{FragmentSource, FragmentStream, SourceError},
    stream_transport::{EventStream, StreamTransport, TransportError},
    transcript_store::{NoTranscriptStore, TranscriptStore},
    transcript_view::{NoTranscriptView, TranscriptView},
};
pub use use_cases::active_generations::{ActiveGenerations, GenerationGuard};
pub use use_cases::animator::{AnimationResult, Animator};
pub use use_cases::generation_controller::{
    GenerationController, GenerationHandle, GenerationReport, SubmitError,
};
pub use use_cases::stream_generation::{
    GenerationError, NO_CONTENT_MESSAGE, StreamGenerationUseCase, StreamHandle, StreamSummary,
};
