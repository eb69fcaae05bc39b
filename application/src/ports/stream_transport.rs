//! Stream transport port
//!
//! Client-side view of the streaming endpoint: opens a generation and
//! yields decoded [`StreamEvent`]s.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use streamchat_domain::{GenerationRequest, StreamEvent};
use thiserror::Error;

/// Errors that can occur while talking to the streaming endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Server responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Stream ended without a terminal event")]
    UnexpectedEof,
}

impl TransportError {
    pub const CONNECTION_LOST: &'static str = "Connection to the server was lost";

    /// Message shown inline in place of the reply.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Connection(_) | TransportError::UnexpectedEof => {
                Self::CONNECTION_LOST.to_string()
            }
            TransportError::Status { status: 409, .. } => {
                "A reply is already being generated for this conversation".to_string()
            }
            TransportError::Status { status, .. } => {
                format!("The server could not start the generation (HTTP {status})")
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, TransportError::Status { status: 409, .. })
    }
}

/// Decoded event stream for one generation.
///
/// Ends after the first terminal event. Dropping it closes the connection,
/// which the server observes as cancellation.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, TransportError>> + Send>>;

/// Transport to the streaming generation endpoint
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Issue the request and return the decoded event stream
    async fn open(&self, request: &GenerationRequest) -> Result<EventStream, TransportError>;

    /// Models offered by `service` (or the server's default service)
    async fn list_models(&self, service: Option<&str>) -> Result<Vec<String>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failures_share_generic_message() {
        assert_eq!(
            TransportError::UnexpectedEof.user_message(),
            TransportError::CONNECTION_LOST
        );
        assert_eq!(
            TransportError::Connection("reset".into()).user_message(),
            TransportError::CONNECTION_LOST
        );
    }

    #[test]
    fn test_conflict_status() {
        let err = TransportError::Status {
            status: 409,
            message: "busy".into(),
        };
        assert!(err.is_conflict());
        assert!(err.user_message().contains("already"));
    }
}
