//! Browser front end: one upload page and the endpoint it posts to.

pub mod error;
pub mod handlers;
pub mod page;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::Settings;

pub use error::WebError;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.settings.upload.max_request_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/convert", post(handlers::convert_uploads))
        .layer(DefaultBodyLimit::max(body_limit))
        // request_id runs inside the trace span
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .with_state(state)
}

/// Tag each request with an id and log its outcome and latency.
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!("request", request_id = %request_id);
    let response = next.run(request).instrument(span).await;

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
