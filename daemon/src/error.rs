//! Request-level error taxonomy

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("invalid pid {0:?}")]
    InvalidPid(String),

    #[error("process {0} not found")]
    NotFound(i64),

    #[error("failed to kill process {0}")]
    KillFailed(i64),

    #[error("failed to get processes: {0}")]
    Enumeration(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidPid(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::KillFailed(_) | ServiceError::Enumeration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short message sent to the client; details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            ServiceError::InvalidPid(_) => "Invalid PID",
            ServiceError::NotFound(_) => "Process not found",
            ServiceError::KillFailed(_) => "Failed to kill process",
            ServiceError::Enumeration(_) => "Failed to get processes",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_class_maps_to_its_own_status() {
        assert_eq!(
            ServiceError::InvalidPid("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::NotFound(7).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::KillFailed(7).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::Enumeration("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
