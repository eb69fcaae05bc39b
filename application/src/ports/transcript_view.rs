//! Port for rendering the in-progress reply.
//!
//! The animator drives a [`TranscriptView`] one display unit at a time; the
//! controller reports state changes so the view can redraw the composer.

use streamchat_domain::{ComposerView, SessionState};

/// Rendering surface for one conversation's transcript.
pub trait TranscriptView: Send + Sync {
    /// The session moved to `state`; `composer` is the matching input state.
    fn on_state_change(&self, _state: &SessionState, _composer: ComposerView) {}

    /// Append one display unit to the reply being rendered.
    fn reveal(&self, unit: char);

    /// Append several units at once (flush on cancel, batch mode).
    fn reveal_text(&self, text: &str) {
        for unit in text.chars() {
            self.reveal(unit);
        }
    }

    /// Final pass once every unit has been revealed.
    fn finalize(&self, full_text: &str);

    /// Replace the in-progress reply with an inline error.
    fn show_error(&self, message: &str);
}

/// No-op implementation for tests and headless use.
pub struct NoTranscriptView;

impl TranscriptView for NoTranscriptView {
    fn reveal(&self, _unit: char) {}

    fn finalize(&self, _full_text: &str) {}

    fn show_error(&self, _message: &str) {}
}
