//! Generation session controller (client side).
//!
//! One controller per conversation. It owns the session state machine:
//!
//! ```text
//! Idle -> Requesting -> Streaming -> Terminated -> Idle
//!             |             |
//!             +--> Cancelling --> Terminated
//! ```
//!
//! A session runs two tasks that share a [`FragmentQueue`]: the decode task
//! pulls events from the [`StreamTransport`] and queues them, the animator
//! reveals queued units at a fixed tick. Cancelling fires a token; the
//! decode task drops the event stream (closing the connection) and the
//! animator flushes what was already queued.

use super::animator::{AnimationResult, Animator};
use crate::config::AnimationParams;
use crate::ports::stream_transport::{StreamTransport, TransportError};
use crate::ports::transcript_store::{NoTranscriptStore, TranscriptStore};
use crate::ports::transcript_view::TranscriptView;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard};
use streamchat_domain::{
    ChatMessage, ComposerView, ConversationId, DomainError, EngineSelection, FragmentQueue,
    GenerationRequest, SessionOutcome, SessionState,
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("A generation is already in progress for this conversation")]
    AlreadyActive,

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Final result of one generation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub outcome: SessionOutcome,
    /// Text revealed to the view (partial when cancelled).
    pub text: String,
}

/// Handle to a running session.
pub struct GenerationHandle {
    epoch: u64,
    join: JoinHandle<GenerationReport>,
}

impl GenerationHandle {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Wait for the session to terminate and reconcile.
    pub async fn wait(self) -> GenerationReport {
        match self.join.await {
            Ok(report) => report,
            Err(e) => {
                warn!("Generation task ended abnormally: {}", e);
                GenerationReport {
                    outcome: SessionOutcome::Failed("Generation task ended abnormally".into()),
                    text: String::new(),
                }
            }
        }
    }
}

struct SessionSlot {
    state: SessionState,
    epoch: u64,
    cancel: Option<CancellationToken>,
    terminated_epoch: Option<u64>,
    history: Vec<ChatMessage>,
}

/// Controller for one conversation's generations.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct GenerationController {
    conversation_id: ConversationId,
    transport: Arc<dyn StreamTransport>,
    view: Arc<dyn TranscriptView>,
    store: Arc<dyn TranscriptStore>,
    animation: AnimationParams,
    keep_history: bool,
    slot: Arc<Mutex<SessionSlot>>,
}

impl GenerationController {
    pub fn new(
        conversation_id: ConversationId,
        transport: Arc<dyn StreamTransport>,
        view: Arc<dyn TranscriptView>,
    ) -> Self {
        Self {
            conversation_id,
            transport,
            view,
            store: Arc::new(NoTranscriptStore),
            animation: AnimationParams::default(),
            keep_history: false,
            slot: Arc::new(Mutex::new(SessionSlot {
                state: SessionState::Idle,
                epoch: 0,
                cancel: None,
                terminated_epoch: None,
                history: Vec::new(),
            })),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn TranscriptStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_animation(mut self, animation: AnimationParams) -> Self {
        self.animation = animation;
        self
    }

    /// Keep completed turns and send them as history with later requests.
    pub fn with_history(mut self, keep: bool) -> Self {
        self.keep_history = keep;
        self
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn state(&self) -> SessionState {
        self.slot()
            .map(|slot| slot.state.clone())
            .unwrap_or_default()
    }

    pub fn composer(&self) -> ComposerView {
        ComposerView::for_state(&self.state())
    }

    /// Completed turns kept as history.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.slot()
            .map(|slot| slot.history.clone())
            .unwrap_or_default()
    }

    pub fn clear_transcript(&self) {
        if let Some(mut slot) = self.slot() {
            slot.history.clear();
        }
    }

    /// Start a generation.
    ///
    /// Rejected while a session is active; the running session is left
    /// untouched. Must be called from within a tokio runtime.
    pub fn submit(
        &self,
        prompt: impl Into<String>,
        engine: EngineSelection,
    ) -> Result<GenerationHandle, SubmitError> {
        let mut slot = self.slot().ok_or(SubmitError::AlreadyActive)?;
        if slot.state.is_active() {
            debug!(
                "Rejecting submit for {}: session is {}",
                self.conversation_id, slot.state
            );
            return Err(SubmitError::AlreadyActive);
        }

        let mut request =
            GenerationRequest::new(self.conversation_id.clone(), prompt)?.with_engine(engine);
        if self.keep_history {
            request = request.with_history(slot.history.clone());
        }

        let cancel = CancellationToken::new();
        slot.epoch += 1;
        slot.state = SessionState::Requesting;
        slot.cancel = Some(cancel.clone());
        let epoch = slot.epoch;
        drop(slot);

        info!(
            "Generation {} started for conversation {}",
            epoch, self.conversation_id
        );
        self.notify(&SessionState::Requesting);

        let session = self.clone();
        let join = tokio::spawn(async move { session.run_session(epoch, request, cancel).await });

        Ok(GenerationHandle { epoch, join })
    }

    /// Request cancellation of the active session.
    ///
    /// Returns `false` (and does nothing) unless the session is Requesting
    /// or Streaming. Repeated calls are harmless.
    pub fn cancel(&self) -> bool {
        let Some(mut slot) = self.slot() else {
            return false;
        };
        if !slot.state.can_cancel() {
            return false;
        }
        slot.state = SessionState::Cancelling;
        if let Some(token) = &slot.cancel {
            token.cancel();
        }
        drop(slot);

        info!("Generation cancelled for conversation {}", self.conversation_id);
        self.notify(&SessionState::Cancelling);
        true
    }

    fn slot(&self) -> Option<MutexGuard<'_, SessionSlot>> {
        self.slot.lock().ok()
    }

    fn notify(&self, state: &SessionState) {
        self.view.on_state_change(state, ComposerView::for_state(state));
    }

    async fn run_session(
        self,
        epoch: u64,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> GenerationReport {
        let queue = Arc::new(Mutex::new(FragmentQueue::new()));
        let prompt = request.prompt().to_string();

        let decoder = {
            let session = self.clone();
            let queue = Arc::clone(&queue);
            let cancel = cancel.clone();
            tokio::spawn(async move { session.decode(epoch, &request, &queue, &cancel).await })
        };

        let animator = Animator::new(self.animation, Arc::clone(&self.view));
        let AnimationResult { outcome, revealed } = animator.run(&queue, &cancel).await;

        if let Err(e) = decoder.await {
            warn!("Decode task ended abnormally: {}", e);
        }

        let kept = !outcome.is_failure() && !revealed.trim().is_empty();
        let turn = kept.then(|| (prompt.as_str(), revealed.as_str()));
        self.terminate(epoch, outcome.clone(), turn);
        self.reconcile(epoch, outcome, &prompt, revealed, kept)
    }

    /// Decode task: move events from the transport into the queue.
    async fn decode(
        &self,
        epoch: u64,
        request: &GenerationRequest,
        queue: &Mutex<FragmentQueue>,
        cancel: &CancellationToken,
    ) {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            opened = self.transport.open(request) => opened,
        };

        let mut events = match opened {
            Ok(events) => events,
            Err(e) => {
                warn!("Could not open generation stream: {}", e);
                fail(queue, &e);
                return;
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Dropping event stream after cancellation");
                    return;
                }
                next = events.next() => next,
            };

            match next {
                Some(Ok(event)) => {
                    self.mark_streaming(epoch);
                    let terminal = event.is_terminal();
                    if let Ok(mut q) = queue.lock() {
                        q.apply(&event);
                    }
                    if terminal {
                        return;
                    }
                }
                Some(Err(e)) => {
                    warn!("Generation stream failed: {}", e);
                    fail(queue, &e);
                    return;
                }
                None => {
                    fail(queue, &TransportError::UnexpectedEof);
                    return;
                }
            }
        }
    }

    fn mark_streaming(&self, epoch: u64) {
        let Some(mut slot) = self.slot() else {
            return;
        };
        if slot.epoch != epoch || slot.state != SessionState::Requesting {
            return;
        }
        slot.state = SessionState::Streaming;
        drop(slot);
        self.notify(&SessionState::Streaming);
    }

    /// Enter Terminated. Side effects run at most once per session.
    ///
    /// The finished turn joins the history under the same lock, so a
    /// submit accepted right after this point already sees it.
    fn terminate(
        &self,
        epoch: u64,
        outcome: SessionOutcome,
        turn: Option<(&str, &str)>,
    ) -> bool {
        let Some(mut slot) = self.slot() else {
            return false;
        };
        if slot.epoch != epoch || slot.terminated_epoch == Some(epoch) {
            return false;
        }
        slot.terminated_epoch = Some(epoch);
        slot.cancel = None;
        if let Some((prompt, reply)) = turn
            && self.keep_history
        {
            slot.history.push(ChatMessage::user(prompt));
            slot.history.push(ChatMessage::assistant(reply));
        }
        debug!("Generation {} terminated: {:?}", epoch, outcome);
        let state = SessionState::Terminated(outcome);
        slot.state = state.clone();
        drop(slot);

        self.notify(&state);
        true
    }

    /// Persistence hand-off, then back to Idle unless a newer session has
    /// already started.
    fn reconcile(
        &self,
        epoch: u64,
        outcome: SessionOutcome,
        prompt: &str,
        text: String,
        kept: bool,
    ) -> GenerationReport {
        if kept {
            self.store.save_reply(&self.conversation_id, prompt, &text);
        }

        if let Some(mut slot) = self.slot()
            && slot.epoch == epoch
        {
            slot.state = SessionState::Idle;
            drop(slot);
            self.notify(&SessionState::Idle);
        }

        GenerationReport { outcome, text }
    }
}

fn fail(queue: &Mutex<FragmentQueue>, error: &TransportError) {
    if let Ok(mut q) = queue.lock() {
        q.fail(error.user_message());
    }
}
