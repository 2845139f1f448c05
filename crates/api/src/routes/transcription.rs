use axum::{
    Json,
    extract::{Multipart, State},
};
use recita_transcription::{TranscriptionContext, TranscriptionRequest};
use serde::Serialize;

use super::upload::{AudioInfo, Upload};
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub model: String,
    pub confidence: f64,
    pub attempts: u32,
    pub audio_info: AudioInfo,
}

/// Multipart fields: `audio` (file), optional `backend`, `language`,
/// `context` and `expected_reference`.
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let mut upload = Upload::read(multipart).await?;
    let audio = upload.require_audio()?;
    let audio_info = AudioInfo::of(&audio);

    let context = match upload.field("context") {
        Some(raw) => raw
            .parse::<TranscriptionContext>()
            .map_err(ApiError::BadRequest)?,
        None => TranscriptionContext::General,
    };

    let result = state
        .gateway
        .transcribe(TranscriptionRequest {
            audio,
            backend: upload.field("backend"),
            language_hint: upload.field("language"),
            context,
            expected_reference: upload.field("expected_reference"),
        })
        .await?;

    Ok(Json(TranscriptionResponse {
        text: result.text,
        model: result.backend,
        confidence: result.confidence,
        attempts: result.attempts,
        audio_info,
    }))
}

pub async fn backends(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "backends": state.gateway.backend_names() }))
}
