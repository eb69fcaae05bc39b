//! Stream generation use case (serving side).
//!
//! Drives a [`FragmentSource`] for one request and turns its output into
//! [`StreamEvent`]s on a bounded channel: one `Fragment` per non-empty
//! fragment, then exactly one terminal event. A cancelled generation ends
//! without a terminal event. If the receiving side goes away the
//! generation is cancelled.

use super::active_generations::{ActiveGenerations, GenerationGuard};
use crate::config::StreamParams;
use crate::ports::fragment_source::FragmentSource;
use futures::StreamExt;
use std::sync::Arc;
use streamchat_domain::{ConversationId, GenerationRequest, SessionOutcome, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Error event sent when a generation ends without producing any text.
pub const NO_CONTENT_MESSAGE: &str = "No content generated by the model";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Conversation {0} already has an active generation")]
    AlreadyActive(ConversationId),
}

/// Receiving end of a generation's event channel.
///
/// Dropping the handle cancels the generation.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream and collect every event until the channel closes.
    pub async fn collect(mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            events.push(event);
        }
        events
    }
}

/// What happened to one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub outcome: SessionOutcome,
    pub fragments: usize,
}

pub struct StreamGenerationUseCase {
    source: Arc<dyn FragmentSource>,
    active: ActiveGenerations,
    params: StreamParams,
}

impl StreamGenerationUseCase {
    pub fn new(source: Arc<dyn FragmentSource>) -> Self {
        Self {
            source,
            active: ActiveGenerations::new(),
            params: StreamParams::default(),
        }
    }

    pub fn with_params(mut self, params: StreamParams) -> Self {
        self.params = params;
        self
    }

    /// Share an existing registry (e.g. across several use case instances).
    pub fn with_registry(mut self, active: ActiveGenerations) -> Self {
        self.active = active;
        self
    }

    pub fn active(&self) -> &ActiveGenerations {
        &self.active
    }

    /// Start a generation on its own task.
    ///
    /// Fails if the conversation already has a generation in flight. The
    /// conversation's slot is released when the task ends.
    pub fn start(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, GenerationError> {
        let guard = self
            .active
            .try_acquire(request.conversation_id())
            .ok_or_else(|| GenerationError::AlreadyActive(request.conversation_id().clone()))?;

        let (tx, rx) = mpsc::channel(self.params.channel_capacity.max(1));
        let source = Arc::clone(&self.source);

        tokio::spawn(async move {
            let summary = run_with_guard(source.as_ref(), &request, &cancel, &tx, guard).await;
            info!(
                "Generation for conversation {} ended ({:?}, {} fragments)",
                request.conversation_id(),
                summary.outcome,
                summary.fragments
            );
        });

        Ok(StreamHandle::new(rx))
    }

    /// Run a generation inline, sending events to `tx`.
    ///
    /// Does not consult the active-generation registry.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> StreamSummary {
        pump(self.source.as_ref(), request, cancel, tx).await
    }
}

async fn run_with_guard(
    source: &dyn FragmentSource,
    request: &GenerationRequest,
    cancel: &CancellationToken,
    tx: &mpsc::Sender<StreamEvent>,
    _guard: GenerationGuard,
) -> StreamSummary {
    pump(source, request, cancel, tx).await
}

async fn emit(
    tx: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
    event: StreamEvent,
) -> bool {
    if tx.send(event).await.is_err() {
        debug!("Event receiver dropped; cancelling generation");
        cancel.cancel();
        return false;
    }
    true
}

async fn pump(
    source: &dyn FragmentSource,
    request: &GenerationRequest,
    cancel: &CancellationToken,
    tx: &mpsc::Sender<StreamEvent>,
) -> StreamSummary {
    let mut summary = StreamSummary {
        outcome: SessionOutcome::Cancelled,
        fragments: 0,
    };

    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return summary,
        _ = tx.closed() => {
            cancel.cancel();
            return summary;
        }
        opened = source.open(request, cancel.clone()) => opened,
    };

    let mut fragments = match opened {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Fragment source '{}' failed to start: {}", source.service_id(), e);
            let message = e.to_string();
            emit(tx, cancel, StreamEvent::Error(message.clone())).await;
            summary.outcome = SessionOutcome::Failed(message);
            return summary;
        }
    };

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return summary,
            _ = tx.closed() => {
                cancel.cancel();
                return summary;
            }
            next = fragments.next() => next,
        };

        match next {
            Some(Ok(fragment)) => {
                if fragment.is_empty() {
                    continue;
                }
                summary.fragments += 1;
                if !emit(tx, cancel, fragment.into()).await {
                    return summary;
                }
            }
            Some(Err(e)) => {
                warn!("Fragment source '{}' failed mid-stream: {}", source.service_id(), e);
                let message = e.to_string();
                emit(tx, cancel, StreamEvent::Error(message.clone())).await;
                summary.outcome = SessionOutcome::Failed(message);
                return summary;
            }
            None => {
                if summary.fragments == 0 {
                    emit(tx, cancel, StreamEvent::error(NO_CONTENT_MESSAGE)).await;
                    summary.outcome = SessionOutcome::Failed(NO_CONTENT_MESSAGE.to_string());
                } else {
                    emit(tx, cancel, StreamEvent::Done).await;
                    summary.outcome = SessionOutcome::Completed;
                }
                return summary;
            }
        }
    }
}
