//! Conversation domain.
//!
//! - [`conversation_id::ConversationId`]: identity of a conversation
//! - [`message::ChatMessage`]: one turn of history
//! - [`request::GenerationRequest`]: a request for one streamed reply

pub mod conversation_id;
pub mod message;
pub mod request;
