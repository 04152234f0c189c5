use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    RateLimited,
    Unavailable,
    Internal,
}

impl ErrorCode {
    /// Maps a non-success HTTP status from the generation service onto a code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 413 | 415 | 422 => Self::Validation,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            502..=504 => Self::Unavailable,
            _ => Self::Internal,
        }
    }
}

/// Failure reported by the generation service.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("generation service responded with status {status}")
        } else {
            format!("generation service responded with status {status}: {body}")
        };
        Self::new(ErrorCode::from_status(status), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_service_statuses() {
        assert_eq!(ErrorCode::from_status(422), ErrorCode::Validation);
        assert_eq!(ErrorCode::from_status(429), ErrorCode::RateLimited);
        assert_eq!(ErrorCode::from_status(503), ErrorCode::Unavailable);
        assert_eq!(ErrorCode::from_status(500), ErrorCode::Internal);
    }

    #[test]
    fn status_message_includes_trimmed_body() {
        let err = ApiError::from_status(500, "  font missing \n");
        assert_eq!(
            err.message,
            "generation service responded with status 500: font missing"
        );
        let err = ApiError::from_status(404, "");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.to_string(), "generation service responded with status 404");
    }
}
