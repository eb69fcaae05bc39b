//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rotated log files (stderr only if unset)
    pub log_dir: Option<String>,
    /// Filter directive used when no `-v` flag is given (e.g. "info")
    pub filter: Option<String>,
}
