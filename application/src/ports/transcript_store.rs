//! Port for persisting finished replies.
//!
//! The store is only consulted after a session terminates; it never sees
//! partial streaming state.

use streamchat_domain::ConversationId;

/// Persistence collaborator for conversation replies.
///
/// `save_reply` is synchronous and non-fallible: a storage failure must not
/// disturb the chat, so implementations log and carry on.
pub trait TranscriptStore: Send + Sync {
    /// Record the prompt and the (non-blank) reply text.
    fn save_reply(&self, conversation_id: &ConversationId, prompt: &str, reply: &str);
}

/// No-op implementation for tests and when persistence is disabled.
pub struct NoTranscriptStore;

impl TranscriptStore for NoTranscriptStore {
    fn save_reply(&self, _conversation_id: &ConversationId, _prompt: &str, _reply: &str) {}
}
