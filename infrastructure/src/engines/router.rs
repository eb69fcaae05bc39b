use async_trait::async_trait;
use std::sync::Arc;
use streamchat_application::{FragmentSource, FragmentStream, SourceError};
use streamchat_domain::GenerationRequest;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Routes each request to exactly one registered engine.
pub struct SourceRouter {
    sources: Vec<Arc<dyn FragmentSource>>,
    default_service: String,
}

impl SourceRouter {
    pub fn new(sources: Vec<Arc<dyn FragmentSource>>, default_service: impl Into<String>) -> Self {
        Self {
            sources,
            default_service: default_service.into(),
        }
    }

    /// Resolve the engine for a service identifier.
    ///
    /// Priority:
    ///  1. an explicitly requested service must exist, otherwise `UnknownService`
    ///  2. the configured default service
    ///  3. the first registered engine
    ///  4. no engines at all: `Unavailable`
    pub fn resolve(&self, service: Option<&str>) -> Result<&dyn FragmentSource, SourceError> {
        if let Some(service) = service.filter(|s| !s.trim().is_empty()) {
            return self
                .find(service)
                .ok_or_else(|| SourceError::UnknownService(service.to_string()));
        }

        if let Some(source) = self.find(&self.default_service) {
            return Ok(source);
        }

        self.sources
            .first()
            .map(|s| s.as_ref())
            .ok_or_else(|| SourceError::Unavailable("No engines configured".to_string()))
    }

    fn find(&self, service: &str) -> Option<&dyn FragmentSource> {
        self.sources
            .iter()
            .find(|s| s.service_id().eq_ignore_ascii_case(service))
            .map(|s| s.as_ref())
    }

    /// Identifiers of every registered engine, in registration order.
    pub fn services(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| s.service_id().to_string())
            .collect()
    }

    /// Service identifier used when a request names none.
    pub fn default_service(&self) -> Option<String> {
        self.resolve(None).ok().map(|s| s.service_id().to_string())
    }

    pub async fn list_models_for(&self, service: Option<&str>) -> Result<Vec<String>, SourceError> {
        self.resolve(service)?.list_models().await
    }
}

#[async_trait]
impl FragmentSource for SourceRouter {
    fn service_id(&self) -> &str {
        "router"
    }

    async fn open(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, SourceError> {
        let source = self.resolve(request.engine().service())?;
        debug!(
            "Routing conversation {} to '{}'",
            request.conversation_id(),
            source.service_id()
        );
        source.open(request, cancel).await
    }

    async fn list_models(&self) -> Result<Vec<String>, SourceError> {
        self.list_models_for(None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use streamchat_domain::{ConversationId, EngineSelection};

    // -- Mock FragmentSource ---------------------------------------------------

    struct MockSource {
        id: &'static str,
    }

    impl MockSource {
        fn new(id: &'static str) -> Arc<dyn FragmentSource> {
            Arc::new(Self { id })
        }
    }

    #[async_trait]
    impl FragmentSource for MockSource {
        fn service_id(&self) -> &str {
            self.id
        }

        async fn open(
            &self,
            _request: &GenerationRequest,
            _cancel: CancellationToken,
        ) -> Result<FragmentStream, SourceError> {
            Ok(Box::pin(stream::empty()))
        }

        async fn list_models(&self) -> Result<Vec<String>, SourceError> {
            Ok(vec![format!("{}-model", self.id)])
        }
    }

    fn router(default: &str) -> SourceRouter {
        SourceRouter::new(
            vec![MockSource::new("ollama"), MockSource::new("scripted")],
            default,
        )
    }

    // -- resolve routing priority tests ----------------------------------------

    #[test]
    fn explicit_service_takes_highest_priority() {
        let router = router("ollama");
        let source = router.resolve(Some("scripted")).unwrap();
        assert_eq!(source.service_id(), "scripted");
    }

    #[test]
    fn service_lookup_is_case_insensitive() {
        let router = router("ollama");
        let source = router.resolve(Some("Scripted")).unwrap();
        assert_eq!(source.service_id(), "scripted");
    }

    #[test]
    fn unknown_explicit_service_is_an_error() {
        let err = router("ollama").resolve(Some("openai")).err().unwrap();
        assert_eq!(err, SourceError::UnknownService("openai".to_string()));
        assert_eq!(err.to_string(), "Unsupported LLM service type: openai");
    }

    #[test]
    fn missing_service_uses_default() {
        let router = router("scripted");
        let source = router.resolve(None).unwrap();
        assert_eq!(source.service_id(), "scripted");
        let source = router.resolve(Some("  ")).unwrap();
        assert_eq!(source.service_id(), "scripted");
    }

    #[test]
    fn unregistered_default_falls_back_to_first() {
        let router = router("bedrock");
        let source = router.resolve(None).unwrap();
        assert_eq!(source.service_id(), "ollama");
    }

    #[test]
    fn empty_router_is_unavailable() {
        let router = SourceRouter::new(vec![], "ollama");
        assert!(matches!(
            router.resolve(None),
            Err(SourceError::Unavailable(_))
        ));
        assert_eq!(router.default_service(), None);
    }

    #[tokio::test]
    async fn open_routes_by_request_service() {
        let router = router("ollama");
        let request = GenerationRequest::new(ConversationId::try_new("c").unwrap(), "hi")
            .unwrap()
            .with_engine(EngineSelection::default().with_service("nope"));
        let result = router.open(&request, CancellationToken::new()).await;
        assert!(matches!(result, Err(SourceError::UnknownService(_))));
    }

    #[tokio::test]
    async fn list_models_for_service() {
        let router = router("ollama");
        assert_eq!(
            router.list_models_for(Some("scripted")).await.unwrap(),
            vec!["scripted-model".to_string()]
        );
        assert_eq!(
            router.list_models().await.unwrap(),
            vec!["ollama-model".to_string()]
        );
        assert_eq!(router.services(), vec!["ollama", "scripted"]);
    }
}
