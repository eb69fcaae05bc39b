//! Generation request value objects

use super::conversation_id::ConversationId;
use super::message::ChatMessage;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Which generation engine should serve a request.
///
/// Both fields are opaque outside the fragment source router. `None` means
/// "use the configured default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSelection {
    pub service: Option<String>,
    pub model: Option<String>,
}

impl EngineSelection {
    pub fn new(service: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            model: Some(model.into()),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Service identifier, treating blank strings as unset
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Model name, treating blank strings as unset
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// One request for a generation (Value Object)
///
/// Immutable once issued. Identifies at most one active generation per
/// [`ConversationId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    conversation_id: ConversationId,
    prompt: String,
    #[serde(default)]
    engine: EngineSelection,
    #[serde(default)]
    history: Vec<ChatMessage>,
}

impl GenerationRequest {
    /// Create a request, rejecting a blank prompt
    pub fn new(
        conversation_id: ConversationId,
        prompt: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        Ok(Self {
            conversation_id,
            prompt,
            engine: EngineSelection::default(),
            history: Vec::new(),
        })
    }

    pub fn with_engine(mut self, engine: EngineSelection) -> Self {
        self.engine = engine;
        self
    }

    /// Attach the prior turns of the conversation
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn engine(&self) -> &EngineSelection {
        &self.engine
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Full message list for an engine: history followed by the new user turn
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = self.history.clone();
        messages.push(ChatMessage::user(self.prompt.clone()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv() -> ConversationId {
        ConversationId::try_new("c1").unwrap()
    }

    #[test]
    fn test_request_rejects_blank_prompt() {
        assert_eq!(
            GenerationRequest::new(conv(), " \n"),
            Err(DomainError::EmptyPrompt)
        );
    }

    #[test]
    fn test_messages_appends_prompt_after_history() {
        let request = GenerationRequest::new(conv(), "and now?")
            .unwrap()
            .with_history(vec![
                ChatMessage::user("hello"),
                ChatMessage::assistant("hi there"),
            ]);

        let messages = request.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], ChatMessage::user("and now?"));
        assert_eq!(request.history().len(), 2);
    }

    #[test]
    fn test_engine_selection_blank_is_unset() {
        let engine = EngineSelection::default().with_service("  ").with_model("llama3");
        assert_eq!(engine.service(), None);
        assert_eq!(engine.model(), Some("llama3"));
    }
}
