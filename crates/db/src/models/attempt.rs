use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::{AssessmentResult, VerseRange};

/// Output of the transcription gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub confidence: f64,
    /// Name of the backend that produced `text`.
    pub backend: String,
    /// Backend calls made across every backend tried.
    pub attempts: u32,
}

impl TranscriptionResult {
    /// Confidence forced into [0, 1]; non-finite values become 0.
    pub fn clamped(mut self) -> Self {
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

/// Client-side facts about the uploaded recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    #[serde(default)]
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// One completed, graded recitation. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecitationAttempt {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub verse_range: VerseRange,
    #[serde(default)]
    pub recording: RecordingMetadata,
    pub transcription: TranscriptionResult,
    pub assessment: AssessmentResult,
    pub created_at: DateTime,
}

impl RecitationAttempt {
    pub const COLLECTION: &'static str = "recitation_attempts";
}
