use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors surfaced by the conversation relay.
///
/// Local validation failures are raised before any provider call; provider
/// failures are classified at the call site and never retried.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Caller input failed local validation
    #[error("{0}")]
    InvalidArgument(String),

    /// Uploaded file is not a WAV container
    #[error("Only WAV files are supported")]
    UnsupportedFormat,

    /// Provider call succeeded but produced nothing usable
    #[error("Transcription is empty")]
    EmptyResult,

    /// Generic provider failure, message passed through verbatim
    #[error("{0}")]
    UpstreamRejected(String),

    /// The TTS model requires accepting the provider's terms first
    #[error("The `playai-tts` model requires terms acceptance. Please accept the terms at https://console.groq.com/playground?model=playai-tts")]
    ProviderConsentRequired,

    /// Provider rate limit hit
    #[error("{0}")]
    RateLimited(String),

    /// Provider rejected the input as too long or invalid
    #[error("Input text too long for TTS processing. Please try a shorter response.")]
    InputTooLong,

    /// Anything uncategorized
    #[error("{0}")]
    Unexpected(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidArgument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::UnsupportedFormat
            | RelayError::EmptyResult
            | RelayError::UpstreamRejected(_)
            | RelayError::ProviderConsentRequired
            | RelayError::InputTooLong => StatusCode::BAD_REQUEST,
            RelayError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            RelayError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Classify a provider error from the speech-synthesis endpoint.
///
/// The rules are ordered; the first matching substring wins.
pub fn classify_speech_error(message: &str) -> RelayError {
    let lower = message.to_lowercase();
    if lower.contains("terms acceptance") {
        RelayError::ProviderConsentRequired
    } else if lower.contains("rate_limit_exceeded") {
        RelayError::RateLimited(message.to_string())
    } else if lower.contains("input too long") || lower.contains("invalid input") {
        RelayError::InputTooLong
    } else {
        RelayError::UpstreamRejected(message.to_string())
    }
}
