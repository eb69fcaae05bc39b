//! Server configuration from TOML (`[server]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use streamchat_application::StreamParams;

/// Raw server configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind (0 picks a free port)
    pub port: u16,
    /// Capacity of each generation's event channel
    pub channel_capacity: usize,
    /// Interval between keep-alive comments on idle streams
    pub keep_alive_secs: u64,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            channel_capacity: 16,
            keep_alive_secs: 15,
        }
    }
}

impl FileServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(1))
    }

    pub fn stream_params(&self) -> StreamParams {
        StreamParams::default().with_channel_capacity(self.channel_capacity)
    }
}
