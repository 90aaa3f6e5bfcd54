use serde::{Deserialize, Serialize};

/// One user/assistant exchange supplied by the client as history.
///
/// Fields are optional on the wire; a turn missing either side is skipped
/// during message assembly rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai: Option<String>,
}

/// Request body for /generate_response and /tts.
///
/// The TTS endpoint ignores `chat_history`, so it defaults to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub chat_history: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub transcription: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponseBody {
    pub response: String,
}
