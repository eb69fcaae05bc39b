//! Registry of conversations with a generation in flight.
//!
//! Enforces at most one active generation per conversation id on the
//! serving side. The slot is held by a [`GenerationGuard`] and released
//! when the guard is dropped, whether the generation finished normally,
//! failed, or the client went away.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use streamchat_domain::ConversationId;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ActiveGenerations {
    inner: Arc<Mutex<HashSet<ConversationId>>>,
}

impl ActiveGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `id`. Returns `None` if it is already taken.
    pub fn try_acquire(&self, id: &ConversationId) -> Option<GenerationGuard> {
        let mut active = self.inner.lock().ok()?;
        if !active.insert(id.clone()) {
            return None;
        }
        debug!("Generation slot acquired for conversation {}", id);
        Some(GenerationGuard {
            registry: Arc::clone(&self.inner),
            id: id.clone(),
        })
    }

    pub fn is_active(&self, id: &ConversationId) -> bool {
        self.inner
            .lock()
            .map(|active| active.contains(id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|active| active.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds one conversation's generation slot until dropped.
#[derive(Debug)]
pub struct GenerationGuard {
    registry: Arc<Mutex<HashSet<ConversationId>>>,
    id: ConversationId,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        if let Ok(mut active) = self.registry.lock() {
            active.remove(&self.id);
            debug!("Generation slot released for conversation {}", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ConversationId {
        ConversationId::try_new(s).unwrap()
    }

    #[test]
    fn test_second_acquire_is_rejected() {
        let registry = ActiveGenerations::new();
        let guard = registry.try_acquire(&id("a"));
        assert!(guard.is_some());
        assert!(registry.try_acquire(&id("a")).is_none());
        assert!(registry.is_active(&id("a")));
    }

    #[test]
    fn test_distinct_conversations_are_independent() {
        let registry = ActiveGenerations::new();
        let _a = registry.try_acquire(&id("a")).unwrap();
        let _b = registry.try_acquire(&id("b")).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_drop_releases_slot() {
        let registry = ActiveGenerations::new();
        let guard = registry.try_acquire(&id("a")).unwrap();
        drop(guard);
        assert!(registry.is_empty());
        assert!(registry.try_acquire(&id("a")).is_some());
    }
}
