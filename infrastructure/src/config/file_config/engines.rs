//! Engine configuration from TOML (`[engines]` section)

use crate::engines::{OllamaSettings, ScriptedSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEnginesConfig {
    /// Service used when a request does not name one
    pub default_service: String,
    pub ollama: FileOllamaConfig,
    pub scripted: FileScriptedConfig,
}

impl Default for FileEnginesConfig {
    fn default() -> Self {
        Self {
            default_service: "ollama".to_string(),
            ollama: FileOllamaConfig::default(),
            scripted: FileScriptedConfig::default(),
        }
    }
}

/// `[engines.ollama]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    pub enabled: bool,
    pub host: String,
    pub default_model: String,
    pub connect_timeout_secs: u64,
    /// Attempts made by the startup health check
    pub health_check_retries: u32,
    pub health_check_delay_secs: u64,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        let settings = OllamaSettings::default();
        Self {
            enabled: true,
            host: settings.host,
            default_model: settings.default_model,
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            health_check_retries: settings.health_check_retries,
            health_check_delay_secs: settings.health_check_delay.as_secs(),
        }
    }
}

impl FileOllamaConfig {
    pub fn to_settings(&self) -> OllamaSettings {
        OllamaSettings {
            host: self.host.clone(),
            default_model: self.default_model.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            health_check_retries: self.health_check_retries,
            health_check_delay: Duration::from_secs(self.health_check_delay_secs),
        }
    }
}

/// `[engines.scripted]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScriptedConfig {
    pub enabled: bool,
    /// Pause before each fragment, in milliseconds
    pub delay_ms: u64,
    pub default_model: String,
}

impl Default for FileScriptedConfig {
    fn default() -> Self {
        let settings = ScriptedSettings::default();
        Self {
            enabled: true,
            delay_ms: settings.delay.as_millis() as u64,
            default_model: settings.default_model,
        }
    }
}

impl FileScriptedConfig {
    pub fn to_settings(&self) -> ScriptedSettings {
        ScriptedSettings {
            delay: Duration::from_millis(self.delay_ms),
            default_model: self.default_model.clone(),
        }
    }
}
