//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services sequence calls against the platform and hold the authorization
//! policy; they know nothing about HTTP beyond the status each error maps to.

pub mod auth;
pub mod group;
pub mod orchestrator;
pub mod rate_limit;
pub mod repository;

use axum::http::StatusCode;
use corral_client::ClientError;
use thiserror::Error;

pub use orchestrator::RunnerGroupOrchestrator;
pub use rate_limit::RateLimiter;

/// Service error type
///
/// The `Display` text is what the caller sees in the error envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyRequests(String),

    /// Any other platform failure, with the upstream status when there was one
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
}

impl OrchestratorError {
    /// Wrap a platform failure behind a context message
    pub fn upstream(context: impl std::fmt::Display, err: &ClientError) -> Self {
        OrchestratorError::Upstream {
            status: err.status(),
            message: format!("{context}: {err}"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            OrchestratorError::BadRequest(_) => StatusCode::BAD_REQUEST,
            OrchestratorError::Forbidden(_) => StatusCode::FORBIDDEN,
            OrchestratorError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            OrchestratorError::NotFound(_) => StatusCode::NOT_FOUND,
            OrchestratorError::Conflict(_) => StatusCode::CONFLICT,
            OrchestratorError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            OrchestratorError::Upstream { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_status_codes() {
        let cases = [
            (OrchestratorError::BadRequest("x".into()), 400),
            (OrchestratorError::Forbidden("x".into()), 403),
            (OrchestratorError::Unauthorized("x".into()), 401),
            (OrchestratorError::NotFound("x".into()), 404),
            (OrchestratorError::Conflict("x".into()), 409),
            (OrchestratorError::TooManyRequests("x".into()), 429),
        ];
        for (err, code) in cases {
            assert_eq!(err.status_code().as_u16(), code, "{err:?}");
        }
    }

    #[test]
    fn test_upstream_keeps_platform_status() {
        let err = OrchestratorError::upstream(
            "Unable to create runner group",
            &ClientError::api_error(422, "Validation Failed"),
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().starts_with("Unable to create runner group: "));
    }

    #[test]
    fn test_upstream_without_status_is_internal() {
        let err = OrchestratorError::upstream("boom", &ClientError::ParseError("bad json".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
