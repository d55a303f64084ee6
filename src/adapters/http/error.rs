//! Error handling for the gateway.

use crate::domain::DomainError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Gateway error type.
#[derive(Debug)]
pub enum AppError {
    /// Request rejected before reaching a service.
    BadRequest(String),
    /// Gateway misconfiguration.
    Internal(String),
    /// Failure reported by, or while reaching, a microservice.
    Service(DomainError),
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub code: String,
    pub message: String,
}

/// HTTP status for a wire error code.
pub fn status_for(code: &str) -> StatusCode {
    match code {
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "BAD_REQUEST" | "UNKNOWN_PATTERN" => StatusCode::BAD_REQUEST,
        "CONFLICT" => StatusCode::CONFLICT,
        "TRANSPORT" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg),
            AppError::Internal(msg) => ("INTERNAL", msg),
            AppError::Service(err) => (err.code(), err.to_string()),
        };

        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message,
        };

        (status_for(code), Json(body)).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Service(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON error: {err}"))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_statuses() {
        let cases = [
            (DomainError::not_found("task", 3), StatusCode::NOT_FOUND),
            (DomainError::Validation("name is required".into()), StatusCode::BAD_REQUEST),
            (DomainError::UnknownPattern("get_all_invoices".into()), StatusCode::BAD_REQUEST),
            (DomainError::remote("CONFLICT", "duplicate plate"), StatusCode::CONFLICT),
            (DomainError::Transport("refused".into()), StatusCode::BAD_GATEWAY),
            (DomainError::Repo("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
