//! Deterministic offline engine.
//!
//! Streams a canned reply word by word with a fixed delay. Useful for
//! demos and tests without a model server. Models:
//!
//! | model      | behaviour                                   |
//! |------------|---------------------------------------------|
//! | `echo`     | "You said: <prompt>"                        |
//! | `lorem`    | a fixed paragraph of filler text            |
//! | `unstable` | a few words, then a generation error        |
//! | `silent`   | ends without producing any text             |

use async_trait::async_trait;
use std::time::Duration;
use streamchat_application::{FragmentSource, FragmentStream, SourceError};
use streamchat_domain::{Fragment, GenerationRequest};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const SERVICE_ID: &str = "scripted";

const MODELS: [&str; 4] = ["echo", "lorem", "unstable", "silent"];

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do \
eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, \
quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

type Script = (Vec<String>, Option<SourceError>);

#[derive(Debug, Clone)]
pub struct ScriptedSettings {
    /// Pause before each fragment.
    pub delay: Duration,
    pub default_model: String,
}

impl Default for ScriptedSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(40),
            default_model: "echo".to_string(),
        }
    }
}

pub struct ScriptedSource {
    settings: ScriptedSettings,
}

impl ScriptedSource {
    pub fn new(settings: ScriptedSettings) -> Self {
        Self { settings }
    }

    /// Fragments to stream and an optional error to end with.
    fn script(&self, model: &str, prompt: &str) -> Result<Script, SourceError> {
        let words = |text: &str| -> Vec<String> {
            text.split_inclusive(' ').map(str::to_string).collect()
        };
        match model {
            "echo" => Ok((words(&format!("You said: {prompt}")), None)),
            "lorem" => Ok((words(LOREM), None)),
            "unstable" => Ok((
                words("Starting a reply that will not "),
                Some(SourceError::Generation("simulated engine failure".to_string())),
            )),
            "silent" => Ok((Vec::new(), None)),
            other => Err(SourceError::ModelNotAvailable(other.to_string())),
        }
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new(ScriptedSettings::default())
    }
}

#[async_trait]
impl FragmentSource for ScriptedSource {
    fn service_id(&self) -> &str {
        SERVICE_ID
    }

    async fn open(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, SourceError> {
        let model = request
            .engine()
            .model()
            .unwrap_or(&self.settings.default_model);
        let (words, failure) = self.script(model, request.prompt())?;
        debug!("Scripted model '{}' streaming {} fragments", model, words.len());

        let delay = self.settings.delay;
        Ok(Box::pin(async_stream::stream! {
            for word in words {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
                yield Ok(Fragment::new(word));
            }
            if let Some(e) = failure {
                yield Err(e);
            }
        }))
    }

    async fn list_models(&self) -> Result<Vec<String>, SourceError> {
        Ok(MODELS.iter().map(|m| m.to_string()).collect())
    }
}
