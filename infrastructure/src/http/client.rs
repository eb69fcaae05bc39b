//! HTTP client side of the generation server.

use super::dto::{ErrorBody, GenerateBody, ModelsBody};
use crate::sse::decode_event_stream;
use async_trait::async_trait;
use std::time::Duration;
use streamchat_application::{EventStream, StreamTransport, TransportError};
use streamchat_domain::GenerationRequest;
use tracing::debug;

/// [`StreamTransport`] over `POST /api/generate`.
///
/// Dropping the returned stream closes the connection, which the server
/// treats as a stop request.
pub struct HttpStreamTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStreamTransport {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Turn a non-success response into a status error, keeping the
    /// server's error text when it sent one.
    async fn status_error(response: reqwest::Response) -> TransportError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        TransportError::Status { status, message }
    }
}

#[async_trait]
impl StreamTransport for HttpStreamTransport {
    async fn open(&self, request: &GenerationRequest) -> Result<EventStream, TransportError> {
        let url = self.url("api/generate");
        debug!("Opening event stream at {}", url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&GenerateBody::from_request(request))
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        Ok(decode_event_stream(response.bytes_stream()))
    }

    async fn list_models(&self, service: Option<&str>) -> Result<Vec<String>, TransportError> {
        let mut request = self.client.get(self.url("api/models"));
        if let Some(service) = service {
            request = request.query(&[("service", service)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body: ModelsBody = response
            .json()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(body.models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use streamchat_domain::ConversationId;

    #[test]
    fn test_url_join() {
        let transport =
            HttpStreamTransport::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            transport.url("api/generate"),
            "http://localhost:8080/api/generate"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let transport =
            HttpStreamTransport::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let request = GenerationRequest::new(ConversationId::try_new("c").unwrap(), "Hi").unwrap();

        let result = transport.open(&request).await;
        let err = match result {
            Ok(mut stream) => stream.next().await.unwrap().unwrap_err(),
            Err(e) => e,
        };
        assert!(matches!(err, TransportError::Connection(_)));
        assert_eq!(err.user_message(), TransportError::CONNECTION_LOST);
    }
}
