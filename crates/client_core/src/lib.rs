use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{GenerateRequest, GENERATE_PATH},
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid generation service url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    ClientSetup(#[source] reqwest::Error),
    #[error("generation request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error(transparent)]
    Service(ApiError),
    #[error("failed to read generated image: {0}")]
    Body(#[source] reqwest::Error),
}

impl GenerateError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Service(err) => Some(err.code),
            _ => None,
        }
    }
}

/// Something that turns form parameters into image bytes.
///
/// The response is opaque: callers decide how to present it from the request's
/// own `gif` flag.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>, GenerateError>;
}

#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    http: Client,
    endpoint: Url,
}

impl HttpGenerationClient {
    pub fn new(base_url: &str) -> Result<Self, GenerateError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, GenerateError> {
        let endpoint = generate_endpoint(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenerateError::ClientSetup)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn generate_endpoint(base_url: &str) -> Result<Url, GenerateError> {
    let invalid = |reason: String| GenerateError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let base = Url::parse(base_url.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
    }
    base.join(GENERATE_PATH).map_err(|err| invalid(err.to_string()))
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>, GenerateError> {
        info!(
            endpoint = %self.endpoint,
            gif = request.gif,
            hdr = request.hdr,
            text_len = request.text.len(),
            "requesting generated image"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(GenerateError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), "generation service rejected request");
            return Err(GenerateError::Service(ApiError::from_status(
                status.as_u16(),
                &body,
            )));
        }

        let bytes = response.bytes().await.map_err(GenerateError::Body)?;
        debug!(size_bytes = bytes.len(), "received generated image");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
