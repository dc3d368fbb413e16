//! SSE transport for MCP server
//!
//! MCP over HTTP: clients POST JSON-RPC to `/message` and may follow the
//! responses on the `/sse` event stream.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use taxigraph_storage::StorageBackend;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::transport::JsonRpcRequest;
use crate::McpServer;

/// Maximum request body size (1MB)
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Buffered events per subscriber before it lags
const EVENT_BUFFER: usize = 100;

const ENDPOINT_EVENT: &str = r#"{"jsonrpc":"2.0","method":"endpoint","params":{"endpoint":"/message"}}"#;

/// SSE transport state
pub struct SseState<S: StorageBackend + ?Sized> {
    server: Arc<McpServer<S>>,
    event_tx: broadcast::Sender<String>,
    auth_token: Option<String>,
}

impl<S: StorageBackend + ?Sized + 'static> SseState<S> {
    pub fn new(server: Arc<McpServer<S>>, auth_token: Option<String>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            server,
            event_tx,
            auth_token,
        }
    }
}

/// Validates the Bearer token when one is configured
async fn auth_middleware<S: StorageBackend + ?Sized + 'static>(
    State(state): State<Arc<SseState<S>>>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    // No token configured: localhost mode
    let Some(expected_token) = &state.auth_token else {
        return next.run(request).await;
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "));

    match token {
        Some(token) if token == expected_token => next.run(request).await,
        Some(_) => (StatusCode::UNAUTHORIZED, "Invalid token").into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            "Missing or invalid Authorization header",
        )
            .into_response(),
    }
}

/// Create the SSE router
pub fn create_sse_router<S: StorageBackend + ?Sized + 'static>(
    server: Arc<McpServer<S>>,
    auth_token: Option<String>,
) -> Router {
    let state = Arc::new(SseState::new(server, auth_token));

    // Only local browser origins
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://localhost:8080"),
            HeaderValue::from_static("http://127.0.0.1:8080"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/sse", get(sse_handler::<S>))
        .route("/message", post(message_handler::<S>))
        .route("/health", get(health_handler::<S>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ))
        .with_state(state)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
}

/// Liveness plus a store probe
async fn health_handler<S: StorageBackend + ?Sized + 'static>(
    State(state): State<Arc<SseState<S>>>,
) -> impl IntoResponse {
    let storage = match state.server.storage().health_check().await {
        Ok(true) => "ok",
        Ok(false) => "degraded",
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            "unavailable"
        }
    };

    Json(serde_json::json!({
        "status": "ok",
        "server": "taxigraph-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage
    }))
}

/// Server-to-client event stream
async fn sse_handler<S: StorageBackend + ?Sized + 'static>(
    State(state): State<Arc<SseState<S>>>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.event_tx.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default().event("endpoint").data(ENDPOINT_EVENT));

        loop {
            match rx.recv().await {
                Ok(msg) => {
                    yield Ok(Event::default().event("message").data(msg));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("SSE client lagged behind by {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };

    Sse::new(stream)
}

/// Client requests; the response is returned and also broadcast
async fn message_handler<S: StorageBackend + ?Sized + 'static>(
    State(state): State<Arc<SseState<S>>>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    tracing::debug!("Received SSE request: {}", request.method);

    let Some(response) = state.server.handle_message(request).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    if let Ok(json) = serde_json::to_string(&response) {
        // No subscribers is fine
        let _ = state.event_tx.send(json);
    }

    Json(response).into_response()
}

/// Run the SSE server
pub async fn run_sse_server<S: StorageBackend + ?Sized + 'static>(
    server: Arc<McpServer<S>>,
    addr: &str,
    auth_token: Option<String>,
) -> anyhow::Result<()> {
    let router = create_sse_router(server, auth_token);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP SSE server listening on {}", addr);
    tracing::info!("  SSE endpoint: http://{}/sse", addr);
    tracing::info!("  Message endpoint: http://{}/message", addr);
    tracing::info!("  Health check: http://{}/health", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
