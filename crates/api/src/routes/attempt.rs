use axum::{Json, extract::State};
use recita_db::models::{
    AccuracyDetails, AssessmentResult, Discrepancy, RecordingMetadata, TranscriptionResult,
    VerseRange, clamp_score,
};
use recita_services::assessment::normalize;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SaveAttemptRequest {
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
    #[serde(alias = "verseRange")]
    pub verse_range: Option<VerseRange>,
    #[serde(alias = "recordingMetadata")]
    pub recording_metadata: Option<RecordingMetadata>,
    pub transcription: Option<TranscriptionResult>,
    pub assessment: Option<SubmittedAssessment>,
}

/// Client-graded assessment. Numbers are taken as submitted and clamped on
/// conversion, so out-of-range values are bounded rather than rejected.
#[derive(Debug, Deserialize)]
pub struct SubmittedAssessment {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default, alias = "accuracyDetails")]
    pub accuracy: SubmittedAccuracy,
    #[serde(default)]
    pub discrepancies: Vec<Discrepancy>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmittedAccuracy {
    #[serde(default, alias = "overallAccuracy")]
    pub overall_accuracy: f64,
    #[serde(default)]
    pub pronunciation: f64,
    #[serde(default)]
    pub completeness: f64,
    #[serde(default, alias = "correctOrder")]
    pub ordering: f64,
}

impl From<SubmittedAssessment> for AssessmentResult {
    fn from(s: SubmittedAssessment) -> Self {
        AssessmentResult {
            score: clamp_score(s.score),
            feedback: s.feedback.trim().to_string(),
            accuracy: AccuracyDetails {
                overall_accuracy: clamp_score(s.accuracy.overall_accuracy),
                pronunciation: clamp_score(s.accuracy.pronunciation),
                completeness: clamp_score(s.accuracy.completeness),
                ordering: clamp_score(s.accuracy.ordering),
            },
            discrepancies: s.discrepancies,
            suggestions: s.suggestions,
            confidence: s.confidence.unwrap_or(normalize::DEFAULT_CONFIDENCE),
        }
        .clamped()
    }
}

#[derive(Debug, Serialize)]
pub struct SaveAttemptResponse {
    pub success: bool,
    pub attempt_id: String,
    pub ledger_updated: bool,
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}

pub async fn save(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SaveAttemptRequest>,
) -> Result<Json<SaveAttemptResponse>, ApiError> {
    let user_id = required(body.user_id.filter(|u| !u.trim().is_empty()), "user_id")?;
    let verse_range = required(body.verse_range, "verse_range")?;
    let recording = required(body.recording_metadata, "recording_metadata")?;
    let transcription = required(body.transcription, "transcription")?;
    let assessment: AssessmentResult = required(body.assessment, "assessment")?.into();

    let outcome = state
        .recorder
        .record(&user_id, verse_range, recording, transcription, assessment)
        .await?;

    Ok(Json(SaveAttemptResponse {
        success: true,
        attempt_id: outcome.attempt_id().map(|id| id.to_hex()).unwrap_or_default(),
        ledger_updated: outcome.ledger_updated(),
    }))
}
