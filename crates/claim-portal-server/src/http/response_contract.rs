// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    StateUnavailable,
    ScheduleUnavailable,
    AnalyticsUnavailable,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, request_id: &str) -> Self {
        Self {
            code,
            message: message.into(),
            details: json!({}),
            request_id: request_id.to_string(),
        }
    }
}

#[must_use]
pub(crate) fn api_error_status(code: ApiErrorCode) -> StatusCode {
    match code {
        ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
        ApiErrorCode::StateUnavailable
        | ApiErrorCode::ScheduleUnavailable
        | ApiErrorCode::AnalyticsUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status = api_error_status(err.code);
    (status, Json(json!({"error": err}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failures_are_server_errors() {
        for code in [
            ApiErrorCode::StateUnavailable,
            ApiErrorCode::ScheduleUnavailable,
            ApiErrorCode::AnalyticsUnavailable,
        ] {
            assert_eq!(api_error_status(code), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn error_code_serializes_as_variant_name() {
        let err = ApiError::new(ApiErrorCode::StateUnavailable, "portal state unavailable", "req-1");
        let v = serde_json::to_value(err).expect("json");
        assert_eq!(v["code"], "StateUnavailable");
        assert_eq!(v["request_id"], "req-1");
    }
}
