//! Generation engine adapters implementing [`FragmentSource`].
//!
//! [`FragmentSource`]: streamchat_application::FragmentSource

pub mod ollama;
pub mod router;
pub mod scripted;

use crate::config::FileEnginesConfig;
use std::str::FromStr;
use std::sync::Arc;
use streamchat_application::{FragmentSource, SourceError};
use tracing::info;

pub use ollama::{OllamaSettings, OllamaSource};
pub use router::SourceRouter;
pub use scripted::{ScriptedSettings, ScriptedSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    #[default]
    Ollama,
    Scripted,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::Ollama, EngineKind::Scripted];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Ollama => ollama::SERVICE_ID,
            EngineKind::Scripted => scripted::SERVICE_ID,
        }
    }
}

impl FromStr for EngineKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SourceError::UnknownService(s.to_string()))
    }
}

/// Engines built from configuration.
pub struct EngineSet {
    pub router: Arc<SourceRouter>,
    /// Kept separately so the caller can run its health check.
    pub ollama: Option<Arc<OllamaSource>>,
}

/// Build every enabled engine and the router over them.
pub fn build_engines(config: &FileEnginesConfig) -> Result<EngineSet, SourceError> {
    let mut sources: Vec<Arc<dyn FragmentSource>> = Vec::new();
    let mut ollama = None;

    for kind in EngineKind::ALL {
        match kind {
            EngineKind::Ollama if config.ollama.enabled => {
                let source = Arc::new(OllamaSource::new(config.ollama.to_settings())?);
                ollama = Some(Arc::clone(&source));
                sources.push(source);
            }
            EngineKind::Scripted if config.scripted.enabled => {
                sources.push(Arc::new(ScriptedSource::new(config.scripted.to_settings())));
            }
            _ => {}
        }
    }

    let router = SourceRouter::new(sources, config.default_service.clone());
    info!(
        "Engines registered: [{}], default: {}",
        router.services().join(", "),
        router.default_service().unwrap_or_else(|| "none".to_string())
    );

    Ok(EngineSet {
        router: Arc::new(router),
        ollama,
    })
}
