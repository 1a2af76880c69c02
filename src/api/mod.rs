//! HTTP API surface.
//!
//! Thin controllers over the query façade. Authentication is the reverse
//! proxy's job in this deployment; these handlers trust route shape for
//! role separation.
//!
//! ## Endpoints
//!
//! - `GET /health` - liveness and uptime
//! - `GET /v1/users/:user_id/calls` - calls linked to one user
//! - `GET /v1/admin/calls` - reconcile and list all claimed calls
//! - `GET /v1/admin/calls/live` - filtered single-page live listing
//! - `POST /v1/admin/relink` - relink maintenance pass
//! - `POST /v1/webhooks/call` - provider webhook ingestion

mod calls;
mod error;
pub mod types;

pub use error::{ApiError, ApiErrorResponse};
pub use types::*;

use crate::config::CallsyncConfig;
use crate::query::QueryFacade;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MB); webhook payloads are small.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub facade: Arc<QueryFacade>,
    pub config: Arc<CallsyncConfig>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(facade: Arc<QueryFacade>, config: Arc<CallsyncConfig>) -> Self {
        Self {
            facade,
            config,
            start_time: Instant::now(),
        }
    }
}

/// Create the application router with all endpoints and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    Router::new()
        .route("/health", get(calls::health))
        .route("/v1/users/:user_id/calls", get(calls::list_user_calls))
        .route("/v1/admin/calls", get(calls::list_admin_calls))
        .route("/v1/admin/calls/live", get(calls::list_live_calls))
        .route("/v1/admin/relink", post(calls::relink))
        .route("/v1/webhooks/call", post(calls::ingest_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .with_state(state)
}
