//! REST API server for HTML to spreadsheet conversion
//!
//! `POST /process` takes a multipart upload and returns the workbook.
//! Admission is capped and never queues; admitted requests run on a fixed
//! pool of blocking workers under a whole-request timeout.

mod admission;
mod handlers;
mod types;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use html2xlsx_common::{Config, ServerConfig};
use html2xlsx_pipeline::Converter;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use admission::{Admission, AdmissionGuard, WorkerPool};
pub use handlers::*;
pub use types::*;

/// Room for multipart boundaries and headers around the file field
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// API server state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    /// Runs one upload through the pipeline
    pub converter: Arc<Converter>,
    /// In-flight request ceiling
    pub admission: Admission,
    /// Blocking workers for conversions
    pub workers: WorkerPool,
    pub limits: Arc<ServerConfig>,
}

impl ApiState {
    /// State with a headless Chrome converter
    #[must_use]
    pub fn new(config: Config) -> Self {
        let converter = Converter::with_chrome(config.conversion);
        Self::with_converter(config.server, converter)
    }

    #[must_use]
    pub fn with_converter(server: ServerConfig, converter: Converter) -> Self {
        Self {
            converter: Arc::new(converter),
            admission: Admission::new(server.max_concurrent_requests),
            workers: WorkerPool::new(server.max_workers),
            limits: Arc::new(server),
        }
    }
}

/// Build the API router with all endpoints
pub fn build_router(state: ApiState) -> Router {
    let body_limit = state
        .limits
        .max_file_size
        .saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/status", get(server_status))
        .route("/process", post(process_html))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: ApiState) -> Result<(), std::io::Error> {
    axum::serve(listener, build_router(state)).await
}

/// Start the API server
pub async fn start_server(addr: &str, state: ApiState) -> Result<(), std::io::Error> {
    tracing::info!("Starting API server on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state).await
}
