//! Animation configuration from TOML (`[animation]` section)

use serde::{Deserialize, Serialize};
use streamchat_application::AnimationParams;

/// Raw animation configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnimationConfig {
    /// Reveal one character per tick; when false replies appear as they arrive
    pub enabled: bool,
    /// Tick interval in milliseconds
    pub tick_ms: u64,
}

impl Default for FileAnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_ms: 15,
        }
    }
}

impl FileAnimationConfig {
    pub fn to_params(&self) -> AnimationParams {
        if self.enabled {
            AnimationParams::from_tick_ms(self.tick_ms)
        } else {
            AnimationParams::instant()
        }
    }
}
