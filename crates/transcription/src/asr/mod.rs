pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recita_config::TranscriptionSettings;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::info;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;

/// An uploaded audio payload.
#[derive(Debug, Clone)]
pub struct AudioSample {
    pub bytes: Vec<u8>,
    /// MIME type as reported by the upload, e.g. `audio/webm`.
    pub mime_type: String,
    pub file_name: String,
}

impl AudioSample {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: "recording.webm".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One call to a speech backend.
pub struct SpeechRequest<'a> {
    pub audio: &'a AudioSample,
    /// Instruction text; backends that accept a prompt pass it through.
    pub prompt: &'a str,
    /// Optional language hint (ISO 639-1, e.g. "ar", "en").
    pub language_hint: Option<&'a str>,
}

/// Raw backend output before gateway post-processing.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub text: String,
    /// Backend-reported quality signal in [0, 1], if any.
    pub confidence: Option<f64>,
}

/// Failure of a single backend call, classified so retry and fallback
/// decisions stay backend-agnostic.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Overload, timeout or connection failure. Retried with backoff.
    #[error("transient failure: {0}")]
    Transient(String),
    /// Quota or rate limit. Never retried.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// The backend rejected the audio itself. Never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Credentials rejected. Not retried; the gateway moves on.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The backend answered, but the reply is unusable.
    #[error("malformed reply: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Maps a non-success HTTP status and body to an error class.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = format!("{status}: {}", truncate(body, 300));
        match status.as_u16() {
            429 => BackendError::RateLimited(detail),
            401 | 403 => BackendError::Unauthorized(detail),
            400 if body.contains("API_KEY_INVALID") => BackendError::Unauthorized(detail),
            400 | 413 | 415 | 422 => BackendError::InvalidInput(detail),
            500 | 502 | 503 | 504 | 529 => BackendError::Transient(detail),
            s if s >= 500 => BackendError::Transient(detail),
            _ => BackendError::Malformed(detail),
        }
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Malformed(err.to_string())
        } else {
            BackendError::Transient(err.to_string())
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Trait for interchangeable speech-to-text backends.
#[async_trait]
pub trait SpeechBackend: Send + Sync + 'static {
    /// Transcribes a complete recording.
    async fn transcribe(&self, request: SpeechRequest<'_>) -> Result<BackendReply, BackendError>;

    /// Stable backend name used for selection and reporting.
    fn name(&self) -> &str;
}

/// Builds every backend whose credentials are present, in `settings.priority`
/// order.
pub fn build_backends(
    settings: &TranscriptionSettings,
) -> Result<Vec<Arc<dyn SpeechBackend>>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .build()?;

    let mut backends: Vec<Arc<dyn SpeechBackend>> = Vec::new();
    for name in &settings.priority {
        match name.as_str() {
            "openai" if settings.openai.is_configured() => {
                backends.push(Arc::new(OpenAiBackend::new(client.clone(), &settings.openai)));
            }
            "gemini" if settings.gemini.is_configured() => {
                backends.push(Arc::new(GeminiBackend::new(client.clone(), &settings.gemini)));
            }
            "openai" | "gemini" => {
                info!(backend = %name, "Speech backend has no credentials, skipping");
            }
            other => {
                tracing::warn!(backend = %other, "Unknown speech backend in priority list");
            }
        }
    }
    Ok(backends)
}
