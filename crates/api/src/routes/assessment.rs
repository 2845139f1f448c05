use axum::{Json, extract::State};
use recita_db::models::AssessmentResult;
use recita_services::AssessmentRequest;
use serde::Deserialize;
use validator::Validate;

use crate::{error::ApiError, extractors::ApiJson, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct AssessRequest {
    #[serde(default, alias = "transcribedText")]
    #[validate(length(min = 1, message = "transcribed_text is required"))]
    pub transcribed_text: String,
    #[serde(default, alias = "originalText")]
    #[validate(length(min = 1, message = "original_text is required"))]
    pub original_text: String,
    #[serde(default, alias = "originalDiacriticalText")]
    pub original_diacritical_text: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "reference is required"))]
    pub reference: String,
    #[serde(default, alias = "judgeBackend")]
    pub judge_backend: Option<String>,
    #[serde(default, alias = "verseCount")]
    pub verse_count: Option<usize>,
}

pub async fn assess(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AssessRequest>,
) -> Result<Json<AssessmentResult>, ApiError> {
    body.validate()?;

    let result = state
        .judge
        .assess(&AssessmentRequest {
            transcript: body.transcribed_text,
            original_text: body.original_text,
            original_diacritical_text: body.original_diacritical_text,
            reference: body.reference,
            judge: body.judge_backend,
            verse_count: body.verse_count,
        })
        .await?;

    Ok(Json(result))
}

pub async fn backends(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "backends": state.judge.backend_names(),
        "default": state.settings.judge.default_backend,
    }))
}
