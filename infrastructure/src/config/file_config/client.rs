//! Client configuration from TOML (`[client]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use streamchat_domain::EngineSelection;

/// Raw client configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClientConfig {
    /// Base URL of the streaming server
    pub server_url: String,
    /// Conversation id used by `chat` and `ask`
    pub conversation_id: String,
    /// Engine service to request (server default if unset)
    pub service: Option<String>,
    /// Model to request (engine default if unset)
    pub model: Option<String>,
    /// Connect timeout for the streaming request
    pub connect_timeout_secs: u64,
    /// Send earlier turns as history
    pub keep_history: bool,
    /// Path to the REPL history file
    pub history_file: Option<String>,
}

impl Default for FileClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            conversation_id: "default".to_string(),
            service: None,
            model: None,
            connect_timeout_secs: 5,
            keep_history: true,
            history_file: None,
        }
    }
}

impl FileClientConfig {
    pub fn engine(&self) -> EngineSelection {
        EngineSelection {
            service: self.service.clone(),
            model: self.model.clone(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
