//! Backend-to-UI events and error modeling for the generator controller.

use client_core::GenerateError;
use shared::error::ErrorCode;

use crate::media::DecodedPreview;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    GenerationSucceeded {
        request_id: u64,
        bytes: Vec<u8>,
        preview: Result<DecodedPreview, String>,
    },
    GenerationFailed {
        request_id: u64,
        error: UiError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Service,
    Unknown,
}

impl UiErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Transport => "Transport",
            Self::Validation => "Validation",
            Self::Service => "Service",
            Self::Unknown => "Unexpected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Generate,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("unavailable")
            || message_lower.contains("rate limit")
            || message_lower.contains("status 5")
        {
            UiErrorCategory::Service
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_generate_error(err: &GenerateError) -> Self {
        let category = match err {
            GenerateError::Transport(_) | GenerateError::Body(_) => UiErrorCategory::Transport,
            GenerateError::InvalidBaseUrl { .. } | GenerateError::ClientSetup(_) => {
                UiErrorCategory::Unknown
            }
            GenerateError::Service(api) => match api.code {
                ErrorCode::Validation => UiErrorCategory::Validation,
                ErrorCode::RateLimited | ErrorCode::Unavailable | ErrorCode::Internal => {
                    UiErrorCategory::Service
                }
                ErrorCode::NotFound => UiErrorCategory::Unknown,
            },
        };
        Self {
            category,
            context: UiErrorContext::Generate,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One-line text for the failure toast.
pub fn describe_generation_failure(err: &UiError) -> String {
    match err.category() {
        UiErrorCategory::Transport => {
            "Generation service unreachable; check the server URL and retry.".to_string()
        }
        UiErrorCategory::Service => {
            format!("Generation service is having trouble: {}", err.message())
        }
        category => format!("{} error: {}", category.label(), err.message()),
    }
}
