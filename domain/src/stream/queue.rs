//! Client-side buffer between the stream decoder and the animator.

use super::event::StreamEvent;
use std::collections::VecDeque;

/// FIFO of display units awaiting reveal.
///
/// Fragments are split into `char`s and appended at the tail; the animator
/// pops one unit per tick from the head. Once the source is exhausted (a
/// terminal event was seen) nothing more is appended. A failure discards
/// whatever is still pending.
#[derive(Debug, Default)]
pub struct FragmentQueue {
    pending: VecDeque<char>,
    exhausted: bool,
    failure: Option<String>,
    received: usize,
}

impl FragmentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment's units at the tail.
    ///
    /// Returns `false` (and appends nothing) once the source is exhausted.
    pub fn push_fragment(&mut self, text: &str) -> bool {
        if self.exhausted {
            return false;
        }
        let before = self.pending.len();
        self.pending.extend(text.chars());
        self.received += self.pending.len() - before;
        true
    }

    /// Apply one decoded event.
    ///
    /// Returns `false` when the event was discarded because the source was
    /// already exhausted.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        if self.exhausted {
            return false;
        }
        match event {
            StreamEvent::Fragment(text) => self.push_fragment(text),
            StreamEvent::Done => {
                self.mark_exhausted();
                true
            }
            StreamEvent::Error(message) => {
                self.fail(message.clone());
                true
            }
        }
    }

    /// No more fragments will arrive.
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    /// Record a failure: exhausts the source and discards pending units.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.exhausted = true;
        self.pending.clear();
        if self.failure.is_none() {
            self.failure = Some(message.into());
        }
    }

    /// Take the unit at the head of the queue.
    pub fn pop(&mut self) -> Option<char> {
        self.pending.pop_front()
    }

    /// Take every pending unit at once, in order.
    pub fn drain(&mut self) -> String {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Empty and exhausted: the animator can do its final pass.
    pub fn is_drained(&self) -> bool {
        self.exhausted && self.pending.is_empty()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Total number of units ever appended.
    pub fn received(&self) -> usize {
        self.received
    }
}
