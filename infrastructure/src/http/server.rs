//! Generation server.
//!
//! Routes:
//!
//! | method | path             | response                                   |
//! |--------|------------------|--------------------------------------------|
//! | POST   | `/api/generate`  | `text/event-stream` of encoded events      |
//! | GET    | `/api/models`    | models of `?service=` (or the default)     |
//! | GET    | `/api/services`  | registered services and the default        |
//! | GET    | `/health`        | liveness                                   |
//!
//! A generation is cancelled when the client goes away: dropping the
//! response body drops the cancel guard and closes the event channel.

use super::dto::{ErrorBody, GenerateBody, ModelsBody, ModelsQuery, ServicesBody};
use crate::engines::SourceRouter;
use crate::sse::encode_payload;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::Stream;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use streamchat_application::{SourceError, StreamGenerationUseCase};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody::new(error)))
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub generation: Arc<StreamGenerationUseCase>,
    pub router: Arc<SourceRouter>,
    pub keep_alive: Duration,
}

impl AppState {
    /// Serve generations from `router` with default stream parameters.
    pub fn new(router: Arc<SourceRouter>) -> Self {
        Self {
            generation: Arc::new(StreamGenerationUseCase::new(router.clone())),
            router,
            keep_alive: Duration::from_secs(15),
        }
    }

    pub fn with_generation(mut self, generation: Arc<StreamGenerationUseCase>) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/models", get(models))
        .route("/api/services", get(services))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Generation server listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let request = body
        .into_request()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let conversation_id = request.conversation_id().clone();

    let cancel = CancellationToken::new();
    let mut handle = state
        .generation
        .start(request, cancel.clone())
        .map_err(|e| {
            warn!("Rejected generation: {}", e);
            api_error(StatusCode::CONFLICT, e.to_string())
        })?;
    info!("Streaming generation for conversation {}", conversation_id);

    let guard = cancel.drop_guard();
    let stream = async_stream::stream! {
        let _guard = guard;
        while let Some(event) = handle.recv().await {
            yield Ok::<_, Infallible>(Event::default().data(encode_payload(&event)));
        }
        debug!("Event stream for conversation {} closed", conversation_id);
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(state.keep_alive)))
}

async fn models(
    State(state): State<AppState>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<ModelsBody>, ApiError> {
    let service = query.service.filter(|s| !s.trim().is_empty());
    let models = state
        .router
        .list_models_for(service.as_deref())
        .await
        .map_err(|e| {
            let status = match e {
                SourceError::UnknownService(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            api_error(status, e.to_string())
        })?;

    Ok(Json(ModelsBody {
        service: service.or_else(|| state.router.default_service()),
        models,
    }))
}

async fn services(State(state): State<AppState>) -> Json<ServicesBody> {
    Json(ServicesBody {
        services: state.router.services(),
        default: state.router.default_service(),
    })
}

async fn health() -> Response {
    Json(serde_json::json!({ "status": "ok" })).into_response()
}
