use axum::{
    Json,
    extract::{Multipart, State},
};
use recita_db::models::{AssessmentResult, TranscriptionResult, VerseRange};
use recita_services::RecitationRequest;
use serde::Serialize;

use super::upload::{AudioInfo, Upload};
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct RecitationResponse {
    pub success: bool,
    pub attempt_id: String,
    pub reference: String,
    pub verse_count: usize,
    pub transcription: TranscriptionResult,
    pub assessment: AssessmentResult,
    pub audio_info: AudioInfo,
    pub ledger_updated: bool,
}

/// Multipart fields: `audio` (file), `user_id`, `range` (JSON verse range),
/// optional `transcription_backend`, `judge_backend` and `language`.
pub async fn recite(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RecitationResponse>, ApiError> {
    let mut upload = Upload::read(multipart).await?;
    let audio = upload.require_audio()?;
    let user_id = upload
        .field("user_id")
        .ok_or_else(|| ApiError::BadRequest("user_id is required".to_string()))?;
    let range: VerseRange = upload
        .field("range")
        .ok_or_else(|| ApiError::BadRequest("range is required".to_string()))
        .and_then(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| ApiError::BadRequest(format!("Invalid range: {e}")))
        })?;
    let audio_info = AudioInfo::of(&audio);

    let outcome = state
        .pipeline
        .run(RecitationRequest {
            user_id,
            range,
            audio,
            transcription_backend: upload.field("transcription_backend"),
            judge_backend: upload.field("judge_backend"),
            language: upload.field("language"),
        })
        .await?;

    Ok(Json(RecitationResponse {
        success: true,
        attempt_id: outcome
            .record
            .attempt_id()
            .map(|id| id.to_hex())
            .unwrap_or_default(),
        reference: outcome.passage.reference,
        verse_count: outcome.passage.verse_count,
        ledger_updated: outcome.record.ledger_updated(),
        transcription: outcome.transcription,
        assessment: outcome.assessment,
        audio_info,
    }))
}
