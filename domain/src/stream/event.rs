//! Events carried by a generation stream.
//!
//! A stream is a sequence of [`StreamEvent::Fragment`]s followed by exactly
//! one terminal event ([`StreamEvent::Done`] or [`StreamEvent::Error`]).
//! Nothing follows the terminal event. A stream cut short by cancellation
//! simply ends without one.

use serde::{Deserialize, Serialize};

/// An ordered unit of generated text.
///
/// Has no identity beyond its position in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment(String);

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn into_text(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An event in a streaming generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A chunk of generated text.
    Fragment(String),
    /// Normal end of the stream.
    Done,
    /// The generation failed; carries a human-readable message.
    Error(String),
}

impl StreamEvent {
    pub fn fragment(text: impl Into<String>) -> Self {
        StreamEvent::Fragment(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error(message.into())
    }

    /// Returns the text content if this is a Fragment event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Fragment(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}

impl From<Fragment> for StreamEvent {
    fn from(fragment: Fragment) -> Self {
        StreamEvent::Fragment(fragment.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_text_returns_content() {
        let event = StreamEvent::fragment("hello");
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn done_is_terminal_without_text() {
        assert!(StreamEvent::Done.is_terminal());
        assert_eq!(StreamEvent::Done.text(), None);
    }

    #[test]
    fn error_text_returns_none_and_is_terminal() {
        let event = StreamEvent::error("oops");
        assert_eq!(event.text(), None);
        assert!(event.is_terminal());
    }

    #[test]
    fn fragment_converts_into_event() {
        let event: StreamEvent = Fragment::from("abc").into();
        assert_eq!(event, StreamEvent::Fragment("abc".to_string()));
    }
}
