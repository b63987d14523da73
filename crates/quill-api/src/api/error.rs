// Request failure taxonomy
//
// Every stage classifies the first failure it hits and writes the response
// immediately; nothing downstream runs. Client-facing variants may echo the
// specific reason, internal faults never do.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::common::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, path, or query (400).
    #[error("{0}")]
    BadRequest(String),
    /// Missing/invalid/expired token or bad credentials (401).
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated but not permitted: ownership mismatch (403).
    #[error("insufficient permission")]
    Forbidden,
    /// Resource absent (404).
    #[error("{0}")]
    NotFound(String),
    /// Data-access or infrastructure failure (500). The wrapped error is
    /// logged; the client sees a generic message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::bad_request("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_errors_echo_their_reason() {
        assert_eq!(
            ApiError::unauthorized("authorization header is missing").to_string(),
            "authorization header is missing"
        );
        assert_eq!(ApiError::Forbidden.to_string(), "insufficient permission");
    }
}
