//! HTTP front end: `POST /command` and `GET /health`.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::kernel::pipeline::{Assistant, CommandOutcome};
use crate::logging::VERSION;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// One assistant, one conversation: requests are processed one at a time.
pub type SharedAssistant = Arc<Mutex<Assistant>>;

#[derive(Debug, Default, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router(assistant: SharedAssistant) -> Router {
    Router::new()
        .route("/command", post(command))
        .route("/health", get(health))
        .layer(middleware::from_fn(request_id))
        .with_state(assistant)
}

pub async fn serve(addr: SocketAddr, assistant: SharedAssistant) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(assistant)).await?;
    Ok(())
}

async fn command(
    State(assistant): State<SharedAssistant>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<CommandOutcome>, StatusCode> {
    let text = request.text.unwrap_or_default();

    // Handlers block on the hub; keep them off the async workers.
    let span = tracing::Span::current();
    let outcome = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let mut assistant = assistant.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        assistant.process(&text)
    })
    .await
    .map_err(|e| {
        error!("Command task failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(outcome))
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok", version: VERSION })
}

/// Tags every request with an id, taken from the caller or generated.
async fn request_id(request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", id = %id, path = %request.uri().path());
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
