//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types where
//! needed.

mod animation;
mod client;
mod engines;
mod logging;
mod output;
mod persistence;
mod server;

pub use animation::FileAnimationConfig;
pub use client::FileClientConfig;
pub use engines::{FileEnginesConfig, FileOllamaConfig, FileScriptedConfig};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use persistence::FilePersistenceConfig;
pub use server::FileServerConfig;

use crate::engines::EngineKind;
use serde::{Deserialize, Serialize};
use streamchat_domain::{ConfigIssue, ConfigIssueCode};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Streaming server settings
    pub server: FileServerConfig,
    /// Client settings (chat / ask)
    pub client: FileClientConfig,
    /// Reveal animation settings
    pub animation: FileAnimationConfig,
    /// Generation engines
    pub engines: FileEnginesConfig,
    /// Reply persistence
    pub persistence: FilePersistenceConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log file settings
    pub logging: FileLoggingConfig,
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Engine selection
        let default_service = &self.engines.default_service;
        match default_service.parse::<EngineKind>() {
            Err(_) => issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnknownService {
                    field: "engines.default_service".to_string(),
                    value: default_service.clone(),
                },
                format!(
                    "engines.default_service: unknown service '{}', falling back to the first enabled engine",
                    default_service
                ),
            )),
            Ok(EngineKind::Ollama) if !self.engines.ollama.enabled => {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownService {
                        field: "engines.default_service".to_string(),
                        value: default_service.clone(),
                    },
                    "engines.default_service: 'ollama' is disabled",
                ))
            }
            Ok(EngineKind::Scripted) if !self.engines.scripted.enabled => {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownService {
                        field: "engines.default_service".to_string(),
                        value: default_service.clone(),
                    },
                    "engines.default_service: 'scripted' is disabled",
                ))
            }
            Ok(_) => {}
        }
        if !self.engines.ollama.enabled && !self.engines.scripted.enabled {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: "engines".to_string(),
                },
                "engines: no engine is enabled",
            ));
        }
        if let Some(service) = &self.client.service
            && service.parse::<EngineKind>().is_err()
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnknownService {
                    field: "client.service".to_string(),
                    value: service.clone(),
                },
                format!("client.service: unknown service '{}'", service),
            ));
        }

        // 2. URLs
        if !is_http_url(&self.client.server_url) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidUrl {
                    field: "client.server_url".to_string(),
                    value: self.client.server_url.clone(),
                },
                format!(
                    "client.server_url: '{}' is not an http(s) URL",
                    self.client.server_url
                ),
            ));
        }
        if self.engines.ollama.enabled && !is_http_url(&self.engines.ollama.host) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidUrl {
                    field: "engines.ollama.host".to_string(),
                    value: self.engines.ollama.host.clone(),
                },
                format!(
                    "engines.ollama.host: '{}' is not an http(s) URL",
                    self.engines.ollama.host
                ),
            ));
        }

        // 3. Empty / zero values
        if self.client.conversation_id.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyValue {
                    field: "client.conversation_id".to_string(),
                },
                "client.conversation_id cannot be empty",
            ));
        }
        if self.animation.enabled && self.animation.tick_ms == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "animation.tick_ms".to_string(),
                },
                "animation.tick_ms is 0; using the minimum tick of 1ms",
            ));
        }
        if self.server.channel_capacity == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "server.channel_capacity".to_string(),
                },
                "server.channel_capacity is 0; using 1",
            ));
        }

        issues
    }

    /// Fail if any issue has error severity.
    pub fn ensure_valid(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let issues = self.validate();
        let errors: Vec<String> = issues
            .iter()
            .filter(|issue| issue.is_error())
            .map(|issue| issue.message.clone())
            .collect();
        if errors.is_empty() {
            Ok(issues)
        } else {
            Err(ConfigValidationError::Invalid(errors))
        }
    }
}
