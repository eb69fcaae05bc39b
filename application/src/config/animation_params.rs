//! Animation parameters: reveal pacing for the animator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing of the reveal animation.
///
/// The animator reveals one display unit per `tick`. With `batch` set it
/// reveals everything queued on each tick instead (no visible typing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationParams {
    /// Fixed interval between reveals.
    pub tick: Duration,
    /// Reveal the whole queue per tick instead of one unit.
    pub batch: bool,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            tick: Self::DEFAULT_TICK,
            batch: false,
        }
    }
}

impl AnimationParams {
    pub const DEFAULT_TICK: Duration = Duration::from_millis(15);
    const MIN_TICK: Duration = Duration::from_millis(1);

    /// No pacing: whatever has arrived is shown on the next (short) tick.
    pub fn instant() -> Self {
        Self {
            tick: Self::MIN_TICK,
            batch: true,
        }
    }

    pub fn from_tick_ms(ms: u64) -> Self {
        Self::default().with_tick(Duration::from_millis(ms))
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Tick actually used by the timer; never zero.
    pub fn effective_tick(&self) -> Duration {
        self.tick.max(Self::MIN_TICK)
    }
}
