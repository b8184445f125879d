//! Mapping of engine failures to HTTP responses.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use regression_facade::{FatalKind, RegressionError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can return.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] RegressionError),

    #[error("evaluation exceeded {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("invalid query parameter: {0}")]
    InvalidQuery(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) => match e {
                RegressionError::Validation(_)
                | RegressionError::NoViableCandidate
                | RegressionError::Candidate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                RegressionError::Fatal {
                    kind: FatalKind::UnknownSelector,
                    ..
                } => StatusCode::BAD_REQUEST,
                RegressionError::Fatal { .. } | RegressionError::Worker(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regression_facade::ValidationError;

    #[test]
    fn test_status_mapping() {
        let validation: ApiError = RegressionError::from(ValidationError::Empty {
            field: "X_array".to_string(),
        })
        .into();
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let selector: ApiError = RegressionError::unknown_selector("gpt").into();
        assert_eq!(selector.status(), StatusCode::BAD_REQUEST);

        let none: ApiError = RegressionError::NoViableCandidate.into();
        assert_eq!(none.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let unreachable: ApiError = RegressionError::unreachable("bad label").into();
        assert_eq!(unreachable.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let worker: ApiError = RegressionError::Worker("gone".to_string()).into();
        assert_eq!(worker.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let timeout = ApiError::Timeout(Duration::from_secs(5));
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.to_string(), "evaluation exceeded 5s");
    }

    #[test]
    fn test_engine_message_is_passed_through() {
        let err: ApiError = RegressionError::unknown_selector("gpt").into();
        assert_eq!(
            err.to_string(),
            "Fatal (unknown selector): no model named 'gpt'"
        );
    }
}
