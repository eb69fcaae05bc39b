//! In-process transport.
//!
//! Runs generations on a local [`StreamGenerationUseCase`] and feeds the
//! encoded wire frames back through the decoder in small uneven chunks, so
//! `--local` sessions exercise the same codec path as the HTTP client.

use crate::engines::SourceRouter;
use crate::sse::{decode_event_stream, encode_frame};
use async_trait::async_trait;
use std::convert::Infallible;
use std::sync::Arc;
use streamchat_application::{
    EventStream, SourceError, StreamGenerationUseCase, StreamTransport, TransportError,
};
use streamchat_domain::GenerationRequest;
use tokio_util::sync::CancellationToken;

const DEFAULT_CHUNK_SIZE: usize = 7;

pub struct LoopbackTransport {
    generation: Arc<StreamGenerationUseCase>,
    router: Arc<SourceRouter>,
    chunk_size: usize,
}

impl LoopbackTransport {
    pub fn new(router: Arc<SourceRouter>) -> Self {
        Self {
            generation: Arc::new(StreamGenerationUseCase::new(router.clone())),
            router,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_generation(mut self, generation: Arc<StreamGenerationUseCase>) -> Self {
        self.generation = generation;
        self
    }

    /// Byte length of each chunk handed to the decoder (minimum 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

fn source_status(error: &SourceError) -> u16 {
    match error {
        SourceError::UnknownService(_) => 400,
        _ => 502,
    }
}

#[async_trait]
impl StreamTransport for LoopbackTransport {
    async fn open(&self, request: &GenerationRequest) -> Result<EventStream, TransportError> {
        let cancel = CancellationToken::new();
        let mut handle = self
            .generation
            .start(request.clone(), cancel.clone())
            .map_err(|e| TransportError::Status {
                status: 409,
                message: e.to_string(),
            })?;

        let guard = cancel.drop_guard();
        let chunk_size = self.chunk_size;
        let bytes = async_stream::stream! {
            let _guard = guard;
            while let Some(event) = handle.recv().await {
                let frame = encode_frame(&event).into_bytes();
                for chunk in frame.chunks(chunk_size) {
                    yield Ok::<_, Infallible>(chunk.to_vec());
                }
            }
        };

        Ok(decode_event_stream(bytes))
    }

    async fn list_models(&self, service: Option<&str>) -> Result<Vec<String>, TransportError> {
        self.router
            .list_models_for(service)
            .await
            .map_err(|e| TransportError::Status {
                status: source_status(&e),
                message: e.to_string(),
            })
    }
}
