//! Fragment source port
//!
//! Defines the interface to a generation engine that produces reply text
//! incrementally.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use streamchat_domain::{Fragment, GenerationRequest};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors raised by a fragment source.
///
/// Cancellation is not an error: a cancelled source simply ends its stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Engine returned HTTP {status}: {message}")]
    Engine { status: u16, message: String },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Malformed engine output: {0}")]
    Malformed(String),

    #[error("Unsupported LLM service type: {0}")]
    UnknownService(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

/// Lazy, possibly unbounded sequence of fragments for one request.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment, SourceError>> + Send>>;

/// A generation engine.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Service identifier this source is registered under (e.g. `"ollama"`)
    fn service_id(&self) -> &str;

    /// Start generating a reply for `request`.
    ///
    /// Once `cancel` fires the returned stream must end within a bounded
    /// time, without further fragments and without an error. Dropping the
    /// stream has the same effect.
    async fn open(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, SourceError>;

    /// Names of the models this engine can serve
    async fn list_models(&self) -> Result<Vec<String>, SourceError>;
}
