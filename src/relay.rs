use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{classify_speech_error, RelayError, Result};
use crate::provider::{ChatMessage, SpeechProvider};
use crate::scratch::{Scratch, Staged};
use crate::types::Turn;

/// Fixed instruction prepended to every chat completion so the model answers
/// meta-questions ("what did I ask last?") from the supplied history.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Use the full conversation history to respond, especially for questions about previous interactions. If asked 'What did I ask you last?' or similar, refer to the most recent user message in the history.";

/// TTS input cap, in characters. Keeps requests inside the speech model's
/// input limit instead of round-tripping a provider rejection.
pub const MAX_TTS_CHARS: usize = 200;

/// Stateless relay forwarding one conversation turn at a time to the remote
/// provider. Holds no state across calls; history is caller-supplied.
pub struct ConversationRelay {
    provider: Arc<dyn SpeechProvider>,
    scratch: Arc<dyn Scratch>,
}

impl ConversationRelay {
    pub fn new(provider: Arc<dyn SpeechProvider>, scratch: Arc<dyn Scratch>) -> Self {
        Self { provider, scratch }
    }

    /// Transcribe a WAV upload to text.
    ///
    /// The audio is staged to scratch for the duration of the call, matching
    /// the upload-then-forward flow; the handle is released on every exit
    /// path.
    pub async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String> {
        if !filename.to_ascii_lowercase().ends_with(".wav") {
            return Err(RelayError::UnsupportedFormat);
        }

        let staged = self
            .scratch
            .stage(&audio)
            .map_err(|e| RelayError::Unexpected(e.to_string()))?;
        let audio = staged
            .read()
            .map_err(|e| RelayError::Unexpected(e.to_string()))?;

        let text = self
            .provider
            .transcribe(audio, filename)
            .await
            .map_err(|e| RelayError::UpstreamRejected(e.message))?;

        if text.trim().is_empty() {
            return Err(RelayError::EmptyResult);
        }

        info!("transcribed {} chars from {}", text.len(), filename);
        Ok(text)
    }

    /// Generate the assistant's reply for `prompt` given caller-supplied
    /// history.
    pub async fn generate_response(&self, prompt: &str, history: &[Turn]) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(RelayError::InvalidArgument("Prompt cannot be empty".to_string()));
        }

        let messages = build_messages(prompt, history);
        debug!("sending {} messages to chat completion", messages.len());

        self.provider
            .chat(&messages)
            .await
            .map_err(|e| RelayError::UpstreamRejected(e.message))
    }

    /// Synthesize speech for `text`, returning a scratch handle holding the
    /// WAV payload for the duration of the response transfer.
    pub async fn synthesize(&self, text: &str) -> Result<Box<dyn Staged>> {
        if text.trim().is_empty() {
            return Err(RelayError::InvalidArgument("Text cannot be empty".to_string()));
        }

        let short = truncate_chars(text, MAX_TTS_CHARS);
        let wav = self
            .provider
            .speech(short)
            .await
            .map_err(|e| classify_speech_error(&e.message))?;

        debug!("received {} bytes of synthesized audio", wav.len());
        self.scratch
            .stage(&wav)
            .map_err(|e| RelayError::Unexpected(e.to_string()))
    }
}

/// Assemble the provider message list for one turn.
///
/// Order is load-bearing: system instruction, then each well-formed history
/// turn as user/assistant pairs in caller order, then the new prompt. Turns
/// missing either side are skipped silently.
pub fn build_messages(prompt: &str, history: &[Turn]) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
    for turn in history {
        if let (Some(user), Some(ai)) = (&turn.user, &turn.ai) {
            messages.push(ChatMessage::user(user.clone()));
            messages.push(ChatMessage::assistant(ai.clone()));
        }
    }
    messages.push(ChatMessage::user(prompt));
    messages
}

/// Cut `text` to at most `max` characters, on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
