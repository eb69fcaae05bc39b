//! Wire bodies for the generation server.

use serde::{Deserialize, Serialize};
use streamchat_domain::{
    ChatMessage, ConversationId, DomainError, EngineSelection, GenerationRequest,
};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateBody {
    pub conversation_id: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<ChatMessage>,
}

impl GenerateBody {
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            conversation_id: request.conversation_id().to_string(),
            prompt: request.prompt().to_string(),
            service: request.engine().service().map(str::to_string),
            model: request.engine().model().map(str::to_string),
            history: request.history().to_vec(),
        }
    }

    /// Validate and convert into a domain request.
    pub fn into_request(self) -> Result<GenerationRequest, DomainError> {
        let conversation_id = ConversationId::try_new(self.conversation_id)?;
        let engine = EngineSelection {
            service: self.service,
            model: self.model,
        };
        Ok(GenerationRequest::new(conversation_id, self.prompt)?
            .with_engine(engine)
            .with_history(self.history))
    }
}

/// Query of `GET /api/models`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsQuery {
    pub service: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsBody {
    pub service: Option<String>,
    pub models: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesBody {
    pub services: Vec<String>,
    pub default: Option<String>,
}

/// Error body for non-streaming failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_body_deserializes() {
        let body: GenerateBody =
            serde_json::from_str(r#"{"conversation_id":"c1","prompt":"Hi"}"#).unwrap();
        let request = body.into_request().unwrap();
        assert_eq!(request.conversation_id().as_str(), "c1");
        assert_eq!(request.engine().service(), None);
        assert!(request.history().is_empty());
    }

    #[test]
    fn test_blank_prompt_is_rejected() {
        let body = GenerateBody {
            conversation_id: "c1".into(),
            prompt: "   ".into(),
            service: None,
            model: None,
            history: Vec::new(),
        };
        assert_eq!(body.into_request().unwrap_err(), DomainError::EmptyPrompt);
    }

    #[test]
    fn test_request_keeps_engine_and_history() {
        let request = GenerationRequest::new(ConversationId::try_new("c").unwrap(), "next")
            .unwrap()
            .with_engine(EngineSelection::new("scripted", "echo"))
            .with_history(vec![ChatMessage::user("first"), ChatMessage::assistant("ok")]);

        let json = serde_json::to_string(&GenerateBody::from_request(&request)).unwrap();
        let back: GenerateBody = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_request().unwrap(), request);
    }
}
