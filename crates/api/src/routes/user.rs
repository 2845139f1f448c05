use axum::{
    Json,
    extract::{Path, Query, State},
};
use bson::oid::ObjectId;
use recita_db::models::{
    AssessmentResult, MasteryLedgerEntry, RecitationAttempt, RecordingMetadata,
    TranscriptionResult, VerseRange,
};
use recita_services::dao::base::PaginationParams;
use serde::Serialize;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub id: String,
    pub user_id: String,
    pub reference: String,
    pub verse_range: VerseRange,
    pub recording: RecordingMetadata,
    pub transcription: TranscriptionResult,
    pub assessment: AssessmentResult,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct MasteryResponse {
    pub chapter: u16,
    pub total_attempts: u32,
    pub best_score: u8,
    pub average_score: f64,
    pub verses_attempted: Vec<u16>,
    pub verses_mastered: Vec<u16>,
    pub updated_at: String,
}

pub async fn attempts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state.recorder.history(&user_id, &params).await?;
    let items: Vec<AttemptResponse> = result.items.into_iter().map(to_attempt_response).collect();

    Ok(Json(serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
        "total_pages": result.total_pages,
    })))
}

pub async fn attempt(
    State(state): State<AppState>,
    Path((user_id, attempt_id)): Path<(String, String)>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let aid = ObjectId::parse_str(&attempt_id)
        .map_err(|_| ApiError::BadRequest("Invalid attempt_id".to_string()))?;

    let attempt = state.recorder.attempt(&user_id, aid).await?;
    Ok(Json(to_attempt_response(attempt)))
}

pub async fn mastery(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MasteryResponse>>, ApiError> {
    let entries = state.recorder.mastery(&user_id).await?;
    Ok(Json(entries.into_iter().map(to_mastery_response).collect()))
}

pub async fn mastery_chapter(
    State(state): State<AppState>,
    Path((user_id, chapter)): Path<(String, u16)>,
) -> Result<Json<MasteryResponse>, ApiError> {
    if !recita_db::chapters::is_valid_chapter(chapter) {
        return Err(ApiError::BadRequest(format!("Chapter {chapter} is outside 1..=114")));
    }
    let entry = state.recorder.mastery_chapter(&user_id, chapter).await?;
    Ok(Json(to_mastery_response(entry)))
}

fn to_attempt_response(a: RecitationAttempt) -> AttemptResponse {
    AttemptResponse {
        id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
        user_id: a.user_id,
        reference: a.verse_range.reference_label(),
        verse_range: a.verse_range,
        recording: a.recording,
        transcription: a.transcription,
        assessment: a.assessment,
        created_at: a.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

fn to_mastery_response(e: MasteryLedgerEntry) -> MasteryResponse {
    MasteryResponse {
        chapter: e.chapter,
        total_attempts: e.total_attempts,
        best_score: e.best_score,
        average_score: e.average_score,
        verses_attempted: e.verses_attempted.into_iter().collect(),
        verses_mastered: e.verses_mastered.into_iter().collect(),
        updated_at: e.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
