//! Ollama engine adapter.
//!
//! Streams `POST /api/chat` (newline-delimited JSON, one object per line)
//! and yields each line's `message.content` as a fragment. Lines that
//! cannot be decoded are skipped with a warning; a line with `"done": true`
//! ends the stream.

use crate::sse::lines::LineBuffer;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use streamchat_application::{FragmentSource, FragmentStream, SourceError};
use streamchat_domain::{ChatMessage, Fragment, GenerationRequest};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const SERVICE_ID: &str = "ollama";

/// Connection settings for an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaSettings {
    pub host: String,
    pub default_model: String,
    pub connect_timeout: Duration,
    pub health_check_retries: u32,
    pub health_check_delay: Duration,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            default_model: "llama3".to_string(),
            connect_timeout: Duration::from_secs(5),
            health_check_retries: 3,
            health_check_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

pub struct OllamaSource {
    client: reqwest::Client,
    settings: OllamaSettings,
}

impl OllamaSource {
    pub fn new(settings: OllamaSettings) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.host.trim_end_matches('/'), path)
    }

    /// Probe the server, retrying a bounded number of times.
    pub async fn health_check(&self) -> Result<(), SourceError> {
        let attempts = self.settings.health_check_retries.max(1);
        let mut last_error = SourceError::Unavailable("no attempt made".to_string());

        for attempt in 1..=attempts {
            match self.client.get(self.url("api/tags")).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Ollama reachable at {}", self.settings.host);
                    return Ok(());
                }
                Ok(response) => {
                    last_error = SourceError::Engine {
                        status: response.status().as_u16(),
                        message: "health check failed".to_string(),
                    };
                }
                Err(e) => last_error = SourceError::Unavailable(e.to_string()),
            }
            warn!(
                "Ollama health check {}/{} failed: {}",
                attempt, attempts, last_error
            );
            if attempt < attempts {
                tokio::time::sleep(self.settings.health_check_delay).await;
            }
        }
        Err(last_error)
    }
}

/// One decoded NDJSON line of a chat response.
#[derive(Debug, PartialEq, Eq)]
struct ChatLine {
    content: String,
    done: bool,
    error: Option<String>,
}

fn parse_chat_line(line: &[u8]) -> Result<Option<ChatLine>, serde_json::Error> {
    if line.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    let chunk: ChatChunk = serde_json::from_slice(line)?;
    Ok(Some(ChatLine {
        content: chunk.message.map(|m| m.content).unwrap_or_default(),
        done: chunk.done,
        error: chunk.error,
    }))
}

async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.chars().count() > 200 {
        body.chars().take(200).collect()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl FragmentSource for OllamaSource {
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
            .unwrap_or(&self.settings.default_model)
            .to_string();
        let body = ChatBody {
            model: &model,
            messages: request.messages(),
            stream: true,
        };
        debug!(
            "Ollama chat request: model={}, {} messages",
            model,
            body.messages.len()
        );

        let send = self.client.post(self.url("api/chat")).json(&body).send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Box::pin(futures::stream::empty())),
            response = send => response.map_err(|e| SourceError::Unavailable(e.to_string()))?,
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::ModelNotAvailable(model));
        }
        if !status.is_success() {
            return Err(SourceError::Engine {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        let mut body = Box::pin(response.bytes_stream());
        Ok(Box::pin(async_stream::stream! {
            let mut lines = LineBuffer::new();
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("Ollama stream cancelled");
                        return;
                    }
                    next = body.next() => next,
                };
                let (batch, ended) = match next {
                    Some(Ok(chunk)) => (lines.push(&chunk), false),
                    Some(Err(e)) => {
                        yield Err(SourceError::Unavailable(e.to_string()));
                        return;
                    }
                    None => (lines.finish().into_iter().collect::<Vec<_>>(), true),
                };

                for line in batch {
                    match parse_chat_line(&line) {
                        Ok(None) => {}
                        Ok(Some(chat)) => {
                            if let Some(message) = chat.error {
                                yield Err(SourceError::Generation(message));
                                return;
                            }
                            if !chat.content.is_empty() {
                                yield Ok(Fragment::new(chat.content));
                            }
                            if chat.done {
                                return;
                            }
                        }
                        Err(e) => warn!("Skipping undecodable Ollama line: {}", e),
                    }
                }
                if ended {
                    return;
                }
            }
        }))
    }

    async fn list_models(&self) -> Result<Vec<String>, SourceError> {
        let response = self
            .client
            .get(self.url("api/tags"))
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Engine {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use streamchat_domain::{ConversationId, EngineSelection};
    use tokio::net::TcpListener;

    // -- Fake Ollama server --------------------------------------------------

    /// Serves `parts` as separate body chunks, optionally never finishing.
    fn chunked(parts: Vec<&'static str>, hang: bool) -> Body {
        Body::from_stream(async_stream::stream! {
            for part in parts {
                yield Ok::<_, std::convert::Infallible>(part);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            if hang {
                std::future::pending::<()>().await;
            }
        })
    }

    async fn chat(Json(body): Json<serde_json::Value>) -> Response {
        match body["model"].as_str().unwrap_or_default() {
            "llama3" => chunked(
                vec![
                    "{\"message\":{\"content\":\"Hel\"},\"done\":false}\n{\"mess",
                    "age\":{\"content\":\"lo\"},\"done\":false}\r\n",
                    "{\"done\":true}\n{\"message\":{\"content\":\"late\"}}\n",
                ],
                false,
            )
            .into_response(),
            "broken" => chunked(
                vec![
                    "{\"message\":{\"content\":\"par\"}}\n",
                    "{\"error\":\"model crashed\"}\n",
                ],
                false,
            )
            .into_response(),
            "slow" => chunked(vec!["{\"message\":{\"content\":\"first\"}}\n"], true)
                .into_response(),
            _ => (StatusCode::NOT_FOUND, "model not found").into_response(),
        }
    }

    async fn tags() -> Json<serde_json::Value> {
        Json(serde_json::json!({"models": [{"name": "llama3:latest"}, {"name": "mistral"}]}))
    }

    async fn spawn_ollama() -> OllamaSource {
        let app = Router::new()
            .route("/api/chat", post(chat))
            .route("/api/tags", get(tags));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        OllamaSource::new(OllamaSettings {
            host,
            ..OllamaSettings::default()
        })
        .unwrap()
    }

    fn request(model: Option<&str>) -> GenerationRequest {
        let engine = match model {
            Some(model) => EngineSelection::default().with_model(model),
            None => EngineSelection::default(),
        };
        GenerationRequest::new(ConversationId::try_new("c").unwrap(), "hi")
            .unwrap()
            .with_engine(engine)
    }

    async fn collect(stream: FragmentStream) -> Vec<Result<String, SourceError>> {
        stream.map(|item| item.map(Fragment::into_text)).collect().await
    }

    // -- Streaming tests -----------------------------------------------------

    #[tokio::test]
    async fn test_lines_split_across_chunks_until_done() {
        let source = spawn_ollama().await;
        let stream = source
            .open(&request(None), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            collect(stream).await,
            vec![Ok("Hel".to_string()), Ok("lo".to_string())]
        );
    }

    #[tokio::test]
    async fn test_error_line_ends_stream_with_generation_error() {
        let source = spawn_ollama().await;
        let stream = source
            .open(&request(Some("broken")), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            collect(stream).await,
            vec![
                Ok("par".to_string()),
                Err(SourceError::Generation("model crashed".to_string()))
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_model_is_not_available() {
        let source = spawn_ollama().await;
        let result = source
            .open(&request(Some("nope")), CancellationToken::new())
            .await;

        assert_eq!(
            result.err(),
            Some(SourceError::ModelNotAvailable("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_cancel_ends_stream_without_error() {
        let source = spawn_ollama().await;
        let cancel = CancellationToken::new();
        let mut stream = source
            .open(&request(Some("slow")), cancel.clone())
            .await
            .unwrap();

        assert_eq!(stream.next().await, Some(Ok(Fragment::new("first"))));
        cancel.cancel();
        let next = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("stream did not end after cancel");
        assert_eq!(next, None);
    }

    #[tokio::test]
    async fn test_cancel_before_response_yields_empty_stream() {
        let source = spawn_ollama().await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let stream = source.open(&request(None), cancel).await.unwrap();

        assert!(collect(stream).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_models_reads_tags() {
        let source = spawn_ollama().await;
        assert_eq!(
            source.list_models().await.unwrap(),
            vec!["llama3:latest".to_string(), "mistral".to_string()]
        );
        assert!(source.health_check().await.is_ok());
    }

    #[test]
    fn test_parse_content_line() {
        let line = br#"{"model":"llama3","message":{"role":"assistant","content":"Hel"},"done":false}"#;
        assert_eq!(
            parse_chat_line(line).unwrap(),
            Some(ChatLine {
                content: "Hel".to_string(),
                done: false,
                error: None
            })
        );
    }

    #[test]
    fn test_parse_final_line() {
        let line = br#"{"model":"llama3","done":true,"total_duration":123}"#;
        let chat = parse_chat_line(line).unwrap().unwrap();
        assert!(chat.done);
        assert!(chat.content.is_empty());
    }

    #[test]
    fn test_parse_error_line() {
        let chat = parse_chat_line(br#"{"error":"model 'x' not found"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chat.error.as_deref(), Some("model 'x' not found"));
    }

    #[test]
    fn test_blank_and_garbage_lines() {
        assert_eq!(parse_chat_line(b"   ").unwrap(), None);
        assert!(parse_chat_line(b"{nope").is_err());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let source = OllamaSource::new(OllamaSettings {
            host: "http://localhost:11434/".to_string(),
            ..OllamaSettings::default()
        })
        .unwrap();
        assert_eq!(source.url("api/chat"), "http://localhost:11434/api/chat");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let source = OllamaSource::new(OllamaSettings {
            host: "http://127.0.0.1:9".to_string(),
            health_check_retries: 1,
            ..OllamaSettings::default()
        })
        .unwrap();

        assert!(matches!(
            source.list_models().await,
            Err(SourceError::Unavailable(_))
        ));
        assert!(source.health_check().await.is_err());
    }
}
