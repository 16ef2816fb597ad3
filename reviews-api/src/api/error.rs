//! JSON error responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Error returned by a handler, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reviews_core::Error> for ApiError {
    fn from(err: reviews_core::Error) -> Self {
        match err {
            reviews_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            reviews_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                msg
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_status() {
        let cases = [
            (reviews_core::Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (reviews_core::Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (reviews_core::Error::Generation("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (reviews_core::Error::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
