//! Generation session lifecycle

use std::fmt;

/// How a generation session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The stream reached Done and every unit was revealed.
    Completed,
    /// The user stopped the generation. Not a failure.
    Cancelled,
    /// The stream ended with an error; carries the message shown inline.
    Failed(String),
}

impl SessionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionOutcome::Failed(_))
    }
}

/// State of one conversation's generation session.
///
/// ```text
/// Idle -> Requesting -> Streaming -> Terminated -> Idle
///             |             |
///             +--> Cancelling --> Terminated
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Request issued, no event decoded yet.
    Requesting,
    /// At least one event decoded.
    Streaming,
    /// Stop requested; draining what was already queued.
    Cancelling,
    Terminated(SessionOutcome),
}

impl SessionState {
    /// A generation is in flight (new submissions are rejected).
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Requesting | SessionState::Streaming | SessionState::Cancelling
        )
    }

    /// Only Requesting and Streaming sessions react to a stop request.
    pub fn can_cancel(&self) -> bool {
        matches!(self, SessionState::Requesting | SessionState::Streaming)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Requesting => "requesting",
            SessionState::Streaming => "streaming",
            SessionState::Cancelling => "cancelling",
            SessionState::Terminated(_) => "terminated",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
