//! Fixed-tick reveal of queued display units.
//!
//! The animator is one of the two tasks of a client session. It shares the
//! [`FragmentQueue`] with the decode task and reveals one unit per tick to
//! a [`TranscriptView`]. Ticks are never bunched up after a stall
//! (`MissedTickBehavior::Delay`).

use crate::config::AnimationParams;
use crate::ports::transcript_view::TranscriptView;
use std::sync::{Arc, Mutex};
use streamchat_domain::{FragmentQueue, SessionOutcome};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Result of one animation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationResult {
    pub outcome: SessionOutcome,
    /// Every unit that reached the view, in order.
    pub revealed: String,
}

enum Step {
    Reveal(char),
    RevealBatch(String),
    Wait,
    Finished,
    Failed(String),
}

pub struct Animator {
    params: AnimationParams,
    view: Arc<dyn TranscriptView>,
}

impl Animator {
    pub fn new(params: AnimationParams, view: Arc<dyn TranscriptView>) -> Self {
        Self { params, view }
    }

    /// Reveal units until the queue is drained, fails, or `cancel` fires.
    ///
    /// On cancellation whatever is already queued is flushed to the view
    /// at once and the reply is finalized without an error, unless the
    /// queue had already recorded a failure.
    pub async fn run(
        &self,
        queue: &Arc<Mutex<FragmentQueue>>,
        cancel: &CancellationToken,
    ) -> AnimationResult {
        let mut interval = tokio::time::interval(self.params.effective_tick());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut revealed = String::new();

        loop {
            if cancel.is_cancelled() {
                // An error received before the stop request still wins.
                let failure = lock(queue).and_then(|q| q.failure().map(str::to_string));
                if let Some(message) = failure {
                    self.view.show_error(&message);
                    return AnimationResult {
                        outcome: SessionOutcome::Failed(message),
                        revealed,
                    };
                }
                let rest = lock(queue).map(|mut q| q.drain()).unwrap_or_default();
                if !rest.is_empty() {
                    self.view.reveal_text(&rest);
                    revealed.push_str(&rest);
                }
                self.view.finalize(&revealed);
                return AnimationResult {
                    outcome: SessionOutcome::Cancelled,
                    revealed,
                };
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => continue,
                _ = interval.tick() => {}
            }

            match self.step(queue) {
                Step::Reveal(unit) => {
                    self.view.reveal(unit);
                    revealed.push(unit);
                }
                Step::RevealBatch(units) => {
                    trace!("Revealing {} queued units", units.chars().count());
                    self.view.reveal_text(&units);
                    revealed.push_str(&units);
                }
                Step::Wait => {}
                Step::Finished => {
                    self.view.finalize(&revealed);
                    return AnimationResult {
                        outcome: SessionOutcome::Completed,
                        revealed,
                    };
                }
                Step::Failed(message) => {
                    self.view.show_error(&message);
                    return AnimationResult {
                        outcome: SessionOutcome::Failed(message),
                        revealed,
                    };
                }
            }
        }
    }

    fn step(&self, queue: &Arc<Mutex<FragmentQueue>>) -> Step {
        let Some(mut q) = lock(queue) else {
            return Step::Failed("Fragment queue is unavailable".to_string());
        };
        if let Some(message) = q.failure() {
            return Step::Failed(message.to_string());
        }
        if self.params.batch {
            let units = q.drain();
            if !units.is_empty() {
                return Step::RevealBatch(units);
            }
        } else if let Some(unit) = q.pop() {
            return Step::Reveal(unit);
        }
        if q.is_exhausted() {
            Step::Finished
        } else {
            Step::Wait
        }
    }
}

fn lock(queue: &Mutex<FragmentQueue>) -> Option<std::sync::MutexGuard<'_, FragmentQueue>> {
    queue.lock().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use streamchat_domain::StreamEvent;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingView {
        units: Mutex<Vec<(char, Instant)>>,
        finalized: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl TranscriptView for RecordingView {
        fn reveal(&self, unit: char) {
            self.units.lock().unwrap().push((unit, Instant::now()));
        }

        fn finalize(&self, full_text: &str) {
            self.finalized.lock().unwrap().push(full_text.to_string());
        }

        fn show_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn queue_with(events: &[StreamEvent]) -> Arc<Mutex<FragmentQueue>> {
        let mut queue = FragmentQueue::new();
        for event in events {
            queue.apply(event);
        }
        Arc::new(Mutex::new(queue))
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_unit_per_tick() {
        let view = Arc::new(RecordingView::default());
        let tick = Duration::from_millis(10);
        let animator = Animator::new(AnimationParams::default().with_tick(tick), view.clone());
        let queue = queue_with(&[StreamEvent::fragment("abcde"), StreamEvent::Done]);

        let result = animator.run(&queue, &CancellationToken::new()).await;

        assert_eq!(result.outcome, SessionOutcome::Completed);
        assert_eq!(result.revealed, "abcde");
        let units = view.units.lock().unwrap();
        assert_eq!(units.len(), 5);
        let span = units[4].1 - units[0].1;
        assert!(span >= tick * 4, "reveals spanned only {span:?}");
        assert_eq!(*view.finalized.lock().unwrap(), vec!["abcde".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_within_one_tick_after_drain() {
        let view = Arc::new(RecordingView::default());
        let tick = Duration::from_millis(10);
        let animator = Animator::new(AnimationParams::default().with_tick(tick), view.clone());
        let queue = queue_with(&[StreamEvent::fragment("ab"), StreamEvent::Done]);

        let started = Instant::now();
        animator.run(&queue, &CancellationToken::new()).await;
        let last_reveal = view.units.lock().unwrap()[1].1;

        assert!(Instant::now() - last_reveal <= tick);
        assert!(Instant::now() - started <= tick * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_while_source_is_open() {
        let view = Arc::new(RecordingView::default());
        let animator = Animator::new(AnimationParams::default(), view.clone());
        let queue = queue_with(&[StreamEvent::fragment("a")]);
        let cancel = CancellationToken::new();

        let producer = {
            let queue = queue.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                let mut q = queue.lock().unwrap();
                q.push_fragment("b");
                q.mark_exhausted();
            })
        };

        let result = animator.run(&queue, &cancel).await;
        producer.await.unwrap();
        assert_eq!(result.revealed, "ab");
        assert_eq!(result.outcome, SessionOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_shows_error_and_discards() {
        let view = Arc::new(RecordingView::default());
        let animator = Animator::new(AnimationParams::default(), view.clone());
        let queue = queue_with(&[
            StreamEvent::fragment("partial"),
            StreamEvent::error("engine unavailable"),
        ]);

        let result = animator.run(&queue, &CancellationToken::new()).await;

        assert_eq!(
            result.outcome,
            SessionOutcome::Failed("engine unavailable".to_string())
        );
        assert!(view.units.lock().unwrap().is_empty());
        assert_eq!(
            *view.errors.lock().unwrap(),
            vec!["engine unavailable".to_string()]
        );
        assert!(view.finalized.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_flushes_queued_units() {
        let view = Arc::new(RecordingView::default());
        let animator = Animator::new(
            AnimationParams::default().with_tick(Duration::from_secs(1)),
            view.clone(),
        );
        let queue = queue_with(&[StreamEvent::fragment("Hel")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = animator.run(&queue, &cancel).await;

        assert_eq!(result.outcome, SessionOutcome::Cancelled);
        assert_eq!(result.revealed, "Hel");
        assert!(view.errors.lock().unwrap().is_empty());
        assert_eq!(*view.finalized.lock().unwrap(), vec!["Hel".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_received_before_cancel_is_still_shown() {
        let view = Arc::new(RecordingView::default());
        let animator = Animator::new(
            AnimationParams::default().with_tick(Duration::from_secs(1)),
            view.clone(),
        );
        let queue = queue_with(&[
            StreamEvent::fragment("Hel"),
            StreamEvent::error("model crashed"),
        ]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = animator.run(&queue, &cancel).await;

        assert_eq!(
            result.outcome,
            SessionOutcome::Failed("model crashed".to_string())
        );
        assert_eq!(*view.errors.lock().unwrap(), vec!["model crashed".to_string()]);
        assert!(view.finalized.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_mode_reveals_everything_per_tick() {
        let view = Arc::new(RecordingView::default());
        let animator = Animator::new(AnimationParams::instant(), view.clone());
        let queue = queue_with(&[StreamEvent::fragment("Hello"), StreamEvent::Done]);

        let result = animator.run(&queue, &CancellationToken::new()).await;
        assert_eq!(result.revealed, "Hello");
        assert_eq!(view.units.lock().unwrap().len(), 5);
    }
}
