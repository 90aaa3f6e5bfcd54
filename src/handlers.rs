use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::error::RelayError;
use crate::state::AppState;
use crate::types::{GenerateResponseBody, PromptRequest, TranscriptionResponse};

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /transcribe — multipart WAV upload to transcript.
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, RelayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::Unexpected(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| RelayError::Unexpected(e.to_string()))?;

        info!("received {} bytes for transcription ({})", data.len(), filename);
        let transcription = state.relay.transcribe(data.to_vec(), &filename).await?;
        return Ok(Json(TranscriptionResponse { transcription }));
    }

    Err(RelayError::InvalidArgument("No audio file provided".to_string()))
}

/// POST /generate_response — one conversation turn with caller-supplied
/// history.
pub async fn generate_response(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> Result<Json<GenerateResponseBody>, RelayError> {
    let response = state
        .relay
        .generate_response(&request.prompt, &request.chat_history)
        .await?;
    Ok(Json(GenerateResponseBody { response }))
}

/// POST /tts — synthesize speech, served as a WAV download.
pub async fn tts(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> Result<Response, RelayError> {
    let staged = state.relay.synthesize(&request.prompt).await?;
    let wav = staged
        .read()
        .map_err(|e| RelayError::Unexpected(e.to_string()))?;
    // the staged handle drops here, releasing the scratch file

    Ok((
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"response.wav\"",
            ),
        ],
        wav,
    )
        .into_response())
}
