//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("No handler for message pattern: {0}")]
    UnknownPattern(String),

    /// Unique or foreign-key constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by another microservice; `code` is one of the wire codes.
    #[error("{message}")]
    Remote { code: &'static str, message: String },
}

/// Every code a reply's `err.code` may carry.
pub const ERROR_CODES: &[&str] = &[
    "NOT_FOUND",
    "BAD_REQUEST",
    "UNKNOWN_PATTERN",
    "CONFLICT",
    "TRANSPORT",
    "INTERNAL",
];

impl DomainError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Rebuilds an error received over the wire. Unknown codes become `INTERNAL`.
    pub fn remote(code: &str, message: impl Into<String>) -> Self {
        let code = ERROR_CODES
            .iter()
            .copied()
            .find(|known| *known == code)
            .unwrap_or("INTERNAL");
        Self::Remote {
            code,
            message: message.into(),
        }
    }

    /// Stable error code sent over the wire and mapped to HTTP statuses by the gateway.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) | Self::InvalidPayload(_) => "BAD_REQUEST",
            Self::UnknownPattern(_) => "UNKNOWN_PATTERN",
            Self::Conflict(_) => "CONFLICT",
            Self::Repo(_) | Self::Config(_) => "INTERNAL",
            Self::Transport(_) => "TRANSPORT",
            Self::Remote { code, .. } => *code,
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = DomainError::not_found("client", 42);
        assert_eq!(err.to_string(), "client 42 not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn codes_group_client_errors() {
        assert_eq!(DomainError::Validation("x".into()).code(), "BAD_REQUEST");
        assert_eq!(DomainError::InvalidPayload("x".into()).code(), "BAD_REQUEST");
        assert_eq!(DomainError::Conflict("x".into()).code(), "CONFLICT");
        assert_eq!(DomainError::Repo("x".into()).code(), "INTERNAL");
    }

    #[test]
    fn remote_errors_keep_code_and_message() {
        let err = DomainError::remote("NOT_FOUND", "client 3 not found");
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "client 3 not found");
        assert_eq!(DomainError::remote("TEAPOT", "?").code(), "INTERNAL");
    }
}
