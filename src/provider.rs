use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::ProviderConfig;

/// Failure reported by the remote provider, message preserved verbatim so
/// the relay can classify it.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// One entry of a chat-completion message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

/// Remote AI provider exposing transcription, chat completion, and speech
/// synthesis. Implemented by `GroqClient`; tests substitute a double.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Transcribe WAV audio to text (English, verbose output).
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError>;

    /// Run a chat completion over an assembled message list, returning the
    /// top choice's content.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;

    /// Synthesize speech for `text`, returning WAV bytes.
    async fn speech(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionPayload {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatPayload {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the Groq OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    transcription_model: String,
    speech_model: String,
    voice: String,
}

impl GroqClient {
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            transcription_model: config.transcription_model.clone(),
            speech_model: config.speech_model.clone(),
            voice: config.voice.clone(),
        })
    }

    /// Pull the provider's error message out of a non-success response.
    ///
    /// Groq wraps failures as `{"error": {"message": ...}}`; fall back to the
    /// raw body when the envelope doesn't parse.
    async fn error_message(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| format!("provider returned {status}: {body}"));
        error!("provider error ({}): {}", status, message);
        ProviderError::new(message)
    }
}

#[async_trait]
impl SpeechProvider for GroqClient {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError> {
        debug!("transcribing {} bytes from {}", audio.len(), filename);

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str("audio/wav")
            .map_err(|e| ProviderError::new(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.transcription_model.clone())
            .text("language", "en")
            .text("response_format", "verbose_json");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_message(response).await);
        }

        let payload: TranscriptionPayload = response
            .json()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;
        Ok(payload.text)
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        debug!("chat completion with {} messages", messages.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.chat_model,
                "messages": messages,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_message(response).await);
        }

        let payload: ChatPayload = response
            .json()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;
        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::new("chat completion returned no choices"))
    }

    async fn speech(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        debug!("synthesizing {} chars with voice {}", text.chars().count(), self.voice);

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.speech_model,
                "voice": self.voice,
                "input": text,
                "response_format": "wav",
            }))
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_message(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
