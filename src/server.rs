//! HTTP annotation service.
//!
//! Lets every chat surface (desktop web view, mobile app) call the same
//! annotation pipeline instead of carrying its own copy.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/annotate` | `{content, citations}` → `{text, segments}` |
//! | `POST` | `/render` | `{content, citations, format?, expanded?}` → `{output}` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Unknown render format: 'pdf'" } }
//! ```
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based chat
//! clients can call the service directly.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};

use citemark_core::cache::AnnotationCache;
use citemark_core::expand::{ExpandAll, ExpandedSet, ExpansionState};
use citemark_core::{Annotation, Citation, Message};

use crate::config::Config;
use crate::render::{render, RenderFormat};

/// Shared state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    /// Never held across an `.await`.
    cache: Arc<Mutex<AnnotationCache>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: Arc::new(config.clone()),
            cache: Arc::new(Mutex::new(AnnotationCache::new(config.render.cache_capacity))),
        }
    }

    fn annotate(&self, text: &str, citations: &[Citation]) -> Annotation {
        match self.cache.lock() {
            Ok(mut cache) => cache.annotate(text, citations),
            // Poisoned lock: annotate uncached.
            Err(_) => citemark_core::annotate(text, citations),
        }
    }
}

/// Build the service router; exposed so hosts can mount it under their own server.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/annotate", post(handle_annotate))
        .route("/render", post(handle_render))
        .layer(cors)
        .with_state(state)
}

/// Starts the annotation service on `[server].bind`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, "annotation server started");
    println!("citemark server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`).
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /annotate ============

async fn handle_annotate(
    State(state): State<AppState>,
    payload: Result<Json<Message>, JsonRejection>,
) -> Result<Json<Annotation>, AppError> {
    let Json(message) = payload?;
    Ok(Json(state.annotate(&message.content, &message.citations)))
}

// ============ POST /render ============

#[derive(Deserialize)]
struct RenderRequest {
    #[serde(alias = "response")]
    content: String,
    #[serde(default)]
    citations: Vec<Citation>,
    /// Overrides `[render].format`.
    #[serde(default)]
    format: Option<String>,
    /// Citation ids the reader has expanded.
    #[serde(default)]
    expanded: Vec<String>,
}

#[derive(Serialize)]
struct RenderResponse {
    format: String,
    output: String,
}

async fn handle_render(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<RenderResponse>, AppError> {
    let Json(req) = payload?;

    let format: RenderFormat = req
        .format
        .as_deref()
        .unwrap_or(state.config.render.format.as_str())
        .parse()
        .map_err(|e: anyhow::Error| bad_request(e.to_string()))?;

    let annotation = state.annotate(&req.content, &req.citations);

    let expanded: ExpandedSet = req.expanded.into_iter().collect();
    let expansion: &dyn ExpansionState = if state.config.render.expand_all {
        &ExpandAll
    } else {
        &expanded
    };

    let output = render(&annotation, format, expansion).map_err(|e| internal(e.to_string()))?;

    Ok(Json(RenderResponse {
        format: format.to_string(),
        output,
    }))
}
