//! Composer (input box + send/stop button) view state

use super::state::SessionState;

/// What the send button currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendControl {
    Send,
    Stop,
}

/// UI state of the composer, owned by the generation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerView {
    pub input_enabled: bool,
    pub control: SendControl,
}

impl ComposerView {
    /// Input enabled, control shows Send.
    pub fn ready() -> Self {
        Self {
            input_enabled: true,
            control: SendControl::Send,
        }
    }

    /// Input disabled, control shows Stop.
    pub fn busy() -> Self {
        Self {
            input_enabled: false,
            control: SendControl::Stop,
        }
    }

    pub fn for_state(state: &SessionState) -> Self {
        if state.is_active() {
            Self::busy()
        } else {
            Self::ready()
        }
    }
}

impl Default for ComposerView {
    fn default() -> Self {
        Self::ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::SessionOutcome;

    #[test]
    fn test_composer_follows_state() {
        assert_eq!(
            ComposerView::for_state(&SessionState::Streaming),
            ComposerView::busy()
        );
        assert_eq!(
            ComposerView::for_state(&SessionState::Terminated(SessionOutcome::Cancelled)),
            ComposerView::ready()
        );
        assert!(ComposerView::default().input_enabled);
    }
}
