#![forbid(unsafe_code)]
//! Read-only HTTP surface over the claim portal data directory.

use axum::routing::get;
use axum::Router;
use claim_portal_core::env::{env_bool, env_duration_ms, env_string};
use claim_portal_core::{resolve_data_dir, ENV_CLAIM_LOG_JSON};
use claim_portal_engine::{ClockAdapter, SystemClock};
use claim_portal_store::LocalFsStore;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

mod http;

pub use http::response_contract::{ApiError, ApiErrorCode};

pub const CRATE_NAME: &str = "claim-portal-server";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub shutdown_drain: Duration,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(claim_portal_core::DEFAULT_DATA_DIR),
            bind_addr: "0.0.0.0:8080".to_string(),
            shutdown_drain: Duration::from_millis(2000),
            log_json: true,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            data_dir: resolve_data_dir(),
            bind_addr: env_string("CLAIM_BIND", "0.0.0.0:8080"),
            shutdown_drain: env_duration_ms("CLAIM_SHUTDOWN_DRAIN_MS", 2000),
            log_json: env_bool(ENV_CLAIM_LOG_JSON, true),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub(crate) store: Arc<LocalFsStore>,
    pub(crate) clock: Arc<dyn ClockAdapter>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self::with_clock(data_dir, Arc::new(SystemClock))
    }

    /// `/api/round` resolves against `clock` instead of wall time.
    #[must_use]
    pub fn with_clock(data_dir: PathBuf, clock: Arc<dyn ClockAdapter>) -> Self {
        Self {
            store: Arc::new(LocalFsStore::new(data_dir)),
            clock,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route("/api/state", get(http::handlers::portal_state_handler))
        .route("/api/round", get(http::handlers::round_handler))
        .route("/api/analytics", get(http::handlers::analytics_handler))
        .fallback(http::handlers::not_found_handler)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            http::request_tracing::request_tracing_middleware,
        ))
        .with_state(state)
}
