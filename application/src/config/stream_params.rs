//! Stream parameters: server-side generation buffering.

use serde::{Deserialize, Serialize};

/// Controls the channel between a generation task and its response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    /// Capacity of the bounded event channel; bounds how far a generation
    /// may run ahead of the client.
    pub channel_capacity: usize,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
        }
    }
}

impl StreamParams {
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}
