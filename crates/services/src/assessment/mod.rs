pub mod backend;
pub mod extract;
pub mod normalize;
pub mod prompt;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use recita_db::models::AssessmentResult;
use recita_transcription::BackendError;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use backend::{GeminiJudge, JudgeBackend, OpenAiJudge, build_judges};
pub use normalize::normalize;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Invalid assessment input: {0}")]
    InvalidInput(String),
    #[error("Judge backend '{0}' is not available")]
    UnknownBackend(String),
    #[error("Judge '{backend}' is rate limited: {message}")]
    RateLimited { backend: String, message: String },
    #[error("Judge '{backend}' failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: BackendError,
    },
    #[error("Judge '{backend}' returned an unusable reply: {message}")]
    UnparsableResponse { backend: String, message: String },
}

impl JudgeError {
    pub fn is_input_error(&self) -> bool {
        matches!(self, JudgeError::InvalidInput(_) | JudgeError::UnknownBackend(_))
    }
}

/// Everything the judge needs to grade one transcript.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    pub transcript: String,
    pub original_text: String,
    #[serde(default)]
    pub original_diacritical_text: String,
    pub reference: String,
    /// Judge backend name; the configured default when absent.
    #[serde(default)]
    pub judge: Option<String>,
    #[serde(default)]
    pub verse_count: Option<usize>,
}

impl AssessmentRequest {
    fn validate(&self) -> Result<(), JudgeError> {
        for (field, value) in [
            ("transcript", &self.transcript),
            ("original_text", &self.original_text),
            ("reference", &self.reference),
        ] {
            if value.trim().is_empty() {
                return Err(JudgeError::InvalidInput(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

/// Grades transcripts with one caller-selected judge. A judge failure is
/// surfaced as is; there is no fallback to a different judge.
pub struct AssessmentJudge {
    judges: HashMap<String, Arc<dyn JudgeBackend>>,
    order: Vec<String>,
    default: String,
}

impl AssessmentJudge {
    pub fn new(judges: Vec<Arc<dyn JudgeBackend>>, default: impl Into<String>) -> Self {
        let order = judges.iter().map(|j| j.name().to_string()).collect();
        Self {
            judges: judges
                .into_iter()
                .map(|j| (j.name().to_string(), j))
                .collect(),
            order,
            default: default.into(),
        }
    }

    /// Configured judge names in registration order.
    pub fn backend_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn select(&self, requested: Option<&str>) -> Result<&Arc<dyn JudgeBackend>, JudgeError> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => self
                .judges
                .get(name)
                .ok_or_else(|| JudgeError::UnknownBackend(name.to_string())),
            None => self
                .judges
                .get(&self.default)
                .or_else(|| self.order.first().and_then(|n| self.judges.get(n)))
                .ok_or_else(|| JudgeError::UnknownBackend(self.default.clone())),
        }
    }

    pub async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentResult, JudgeError> {
        request.validate()?;
        let judge = self.select(request.judge.as_deref())?;
        let backend = judge.name().to_string();
        let started = Instant::now();

        let raw = judge
            .complete(&prompt::build_prompt(request))
            .await
            .map_err(|source| match source {
                BackendError::RateLimited(message) => JudgeError::RateLimited {
                    backend: backend.clone(),
                    message,
                },
                source => JudgeError::Backend {
                    backend: backend.clone(),
                    source,
                },
            })
            .inspect_err(|e| warn!(%backend, error = %e, "Judge call failed"))?;

        let value = extract::extract_object(&raw).map_err(|message| {
            warn!(%backend, reply_len = raw.len(), %message, "Judge reply has no JSON object");
            JudgeError::UnparsableResponse {
                backend: backend.clone(),
                message,
            }
        })?;

        for key in ["score", "accuracyDetails", "confidence"] {
            if value.get(key).is_none() {
                debug!(%backend, field = key, "Judge reply lacks field, defaulting");
            }
        }
        let result = normalize(&value);

        info!(
            %backend,
            reference = %request.reference,
            score = result.score,
            mistakes = result.discrepancies.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Assessment complete"
        );
        Ok(result)
    }
}
