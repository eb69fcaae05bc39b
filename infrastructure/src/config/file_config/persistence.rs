//! Persistence configuration from TOML (`[persistence]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw persistence configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersistenceConfig {
    /// Store finished replies in a JSONL transcript
    pub enabled: bool,
    /// Transcript file; defaults to the platform data directory
    pub transcript_path: Option<String>,
}

impl FilePersistenceConfig {
    /// Resolved transcript location, if persistence is enabled.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        match &self.transcript_path {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::data_dir().map(|d| d.join("streamchat").join("transcripts.jsonl")),
        }
    }
}
