use crate::http::request_tracing::RequestId;
use crate::http::response_contract::{api_error_response, ApiError, ApiErrorCode};
use crate::AppState;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use claim_portal_core::sha256_hex;
use claim_portal_engine::{derive_analytics_view, resolve_phase, resolve_schedule, PhaseResolution};
use claim_portal_model::{Schedule, ScheduleTimes};
use claim_portal_store::{AnalyticsSource, PortalStore, ScheduleStore, StoreError};
use serde::Serialize;
use serde_json::json;
use tracing::error;

async fn run_blocking<T, F>(f: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("blocking read task failed: {e}")),
    }
}

pub(crate) async fn healthz_handler() -> &'static str {
    "ok"
}

pub(crate) async fn version_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": crate::CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn not_found_handler(
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> Response {
    api_error_response(ApiError::new(
        ApiErrorCode::NotFound,
        "no such route",
        &request_id,
    ))
}

fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(raw) = headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    raw.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

/// Serves the published state file byte for byte.
pub(crate) async fn portal_state_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
) -> Response {
    let store = state.store.clone();
    let bytes = match run_blocking(move || store.read_portal_state_bytes()).await {
        Ok(bytes) => bytes,
        Err(cause) => {
            error!(request_id = %request_id, %cause, "portal state read failed");
            return api_error_response(ApiError::new(
                ApiErrorCode::StateUnavailable,
                "portal state unavailable",
                &request_id,
            ));
        }
    };
    let etag = format!("\"{}\"", sha256_hex(&bytes));
    let etag_value = HeaderValue::from_str(&etag).unwrap_or_else(|_| HeaderValue::from_static("\"\""));
    if etag_matches(&headers, &etag) {
        return (StatusCode::NOT_MODIFIED, [(ETAG, etag_value)]).into_response();
    }
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (ETAG, etag_value),
        ],
        bytes,
    )
        .into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoundView {
    #[serde(flatten)]
    resolution: PhaseResolution,
    round_number: Option<u64>,
    schedule: Option<Schedule>,
}

pub(crate) async fn round_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> Response {
    let store = state.store.clone();
    let schedule = match run_blocking(move || store.load_schedule()).await {
        Ok(schedule) => schedule,
        Err(cause) => {
            error!(request_id = %request_id, %cause, "schedule read failed");
            return api_error_response(ApiError::new(
                ApiErrorCode::ScheduleUnavailable,
                "schedule unavailable",
                &request_id,
            ));
        }
    };
    let now = state.clock.now();
    let resolution = match &schedule {
        Some(s) => resolve_schedule(s, now),
        None => resolve_phase(&ScheduleTimes::default(), now),
    };
    Json(RoundView {
        resolution,
        round_number: schedule.as_ref().map(|s| s.round_number),
        schedule,
    })
    .into_response()
}

pub(crate) async fn analytics_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
) -> Response {
    let store = state.store.clone();
    match run_blocking(move || store.load_analytics()).await {
        Ok(file) => Json(derive_analytics_view(&file)).into_response(),
        Err(cause) => {
            error!(request_id = %request_id, %cause, "analytics read failed");
            api_error_response(ApiError::new(
                ApiErrorCode::AnalyticsUnavailable,
                "analytics unavailable",
                &request_id,
            ))
        }
    }
}
