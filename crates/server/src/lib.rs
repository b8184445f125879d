//! # server
//!
//! REST API for the regression evaluation engine. Every evaluation runs on
//! the engine's worker pool; results are kept in a bounded in-memory history.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use regression_facade::{RegressionEngine, Result, WorkerPool};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod history;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorResponse};
pub use history::{HistoryEntry, HistoryLog, HistoryStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RegressionEngine>,
    pub pool: WorkerPool,
    pub history: Arc<HistoryStore>,
    pub evaluation_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            engine: Arc::new(RegressionEngine::new(config.engine_config())),
            pool: WorkerPool::new(config.worker_threads)?,
            history: Arc::new(HistoryStore::new(config.history_limit)),
            evaluation_timeout: config.evaluation_timeout,
        })
    }
}

/// Build the router with middleware.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::welcome))
        // Health endpoints
        .route("/health", get(routes::liveness))
        .route("/health/ready", get(routes::readiness))
        // Evaluation endpoints
        .route(
            "/regression/option",
            get(routes::option_info).post(routes::option_post),
        )
        .route("/regression/option/history", get(routes::option_history))
        .route("/regression/best-model", post(routes::best_model_post))
        .route("/regression/best-model/info", get(routes::best_model_info))
        .route(
            "/regression/best-model/history",
            get(routes::best_model_history),
        )
        .route(
            "/regression/stack-model",
            get(routes::stack_model_info).post(routes::stack_model_post),
        )
        .route(
            "/regression/stack-model/history",
            get(routes::stack_model_history),
        )
        .route("/history/:category", get(routes::history_redirect))
        // Middleware layers
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
