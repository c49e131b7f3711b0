//! HTTP-facing errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use loglens_core::constants::MISSING_HANDLER_NAME;

/// Failures that end a request with a non-200 status
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", MISSING_HANDLER_NAME)]
    MissingHandlerName,

    #[error("400 Bad Request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingHandlerName | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_handler_name_message() {
        let err = ApiError::MissingHandlerName;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "400 Bad Request: no handler name provided");
    }

    #[test]
    fn test_forbidden_status() {
        let err = ApiError::Forbidden("Client logger is disabled.".into());
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}
