use std::sync::Arc;
use std::time::Instant;

use recita_db::models::TranscriptionResult;
use tracing::{debug, info, warn};

use crate::asr::{AudioSample, BackendError, BackendReply, SpeechBackend, SpeechRequest};
use crate::config::GatewayConfig;
use crate::error::TranscriptionError;
use crate::prompt::{self, TranscriptionContext};

/// Confidence assumed when a backend reports none.
const DEFAULT_CONFIDENCE: f64 = 0.85;
/// Added to recitation transcripts longer than [`BOOST_MIN_CHARS`].
const RECITATION_BOOST: f64 = 0.1;
const BOOST_MIN_CHARS: usize = 10;
/// Shorter outputs are rejected regardless of reported confidence.
const MIN_TEXT_CHARS: usize = 3;

/// Request to transcribe one recording.
pub struct TranscriptionRequest {
    pub audio: AudioSample,
    /// Preferred backend. Falls through to the priority list when absent,
    /// unknown or failing.
    pub backend: Option<String>,
    pub language_hint: Option<String>,
    pub context: TranscriptionContext,
    /// Reference label the speaker is expected to recite, e.g. "1:1-7".
    pub expected_reference: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(audio: AudioSample) -> Self {
        Self {
            audio,
            backend: None,
            language_hint: None,
            context: TranscriptionContext::General,
            expected_reference: None,
        }
    }
}

/// Converts audio to text across an ordered list of interchangeable backends.
///
/// Each backend gets up to `max_attempts` sequential calls; transient failures
/// back off exponentially between them. Once a backend's budget is spent the
/// next backend in priority order is tried.
pub struct TranscriptionGateway {
    /// Configured backends in fallback priority order.
    backends: Vec<Arc<dyn SpeechBackend>>,
    config: GatewayConfig,
}

impl TranscriptionGateway {
    pub fn new(backends: Vec<Arc<dyn SpeechBackend>>, config: GatewayConfig) -> Self {
        let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
        info!(backends = ?names, "Transcription gateway created");
        Self { backends, config }
    }

    /// Names of the configured backends in priority order.
    pub fn backend_names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    /// Selected backend first (if configured), then the rest in priority order.
    fn backend_order(&self, selected: Option<&str>) -> Vec<Arc<dyn SpeechBackend>> {
        let mut order = Vec::with_capacity(self.backends.len());
        if let Some(name) = selected
            && let Some(backend) = self.backends.iter().find(|b| b.name() == name)
        {
            order.push(backend.clone());
        } else if let Some(name) = selected {
            warn!(backend = %name, "Selected speech backend is not configured, using priority order");
        }
        for backend in &self.backends {
            if !order.iter().any(|b| b.name() == backend.name()) {
                order.push(backend.clone());
            }
        }
        order
    }

    pub async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        if request.audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        if request.audio.len() > self.config.max_audio_bytes {
            return Err(TranscriptionError::AudioTooLarge {
                size: request.audio.len(),
                max: self.config.max_audio_bytes,
            });
        }

        let prompt = prompt::build_prompt(
            request.context,
            request.language_hint.as_deref(),
            request.expected_reference.as_deref(),
        );
        let speech = SpeechRequest {
            audio: &request.audio,
            prompt: &prompt,
            language_hint: request.language_hint.as_deref(),
        };

        let mut attempts = 0u32;
        let mut failures = Vec::new();

        for backend in self.backend_order(request.backend.as_deref()) {
            let name = backend.name().to_string();
            match self.call_with_retry(backend.as_ref(), &speech, &mut attempts).await {
                Ok(reply) => return finish(reply, name, attempts, request.context),
                Err(BackendError::RateLimited(message)) => {
                    warn!(backend = %name, %message, "Speech backend rate limited");
                    return Err(TranscriptionError::RateLimited { backend: name, message });
                }
                Err(BackendError::InvalidInput(message)) => {
                    warn!(backend = %name, %message, "Speech backend rejected audio");
                    return Err(TranscriptionError::InvalidAudio { backend: name, message });
                }
                Err(e) => {
                    warn!(backend = %name, error = %e, "Speech backend failed, falling back");
                    failures.push(format!("{name}: {e}"));
                }
            }
        }

        Err(TranscriptionError::NoBackendAvailable { failures })
    }

    /// Strictly sequential retry loop against one backend.
    async fn call_with_retry(
        &self,
        backend: &dyn SpeechBackend,
        request: &SpeechRequest<'_>,
        attempts: &mut u32,
    ) -> Result<BackendReply, BackendError> {
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 0;
        loop {
            attempt += 1;
            *attempts += 1;
            let started = Instant::now();
            let result = backend
                .transcribe(SpeechRequest {
                    audio: request.audio,
                    prompt: request.prompt,
                    language_hint: request.language_hint,
                })
                .await;

            match result {
                Ok(reply) => {
                    debug!(
                        backend = backend.name(),
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Speech backend replied"
                    );
                    return Ok(reply);
                }
                Err(BackendError::Transient(msg)) if attempt < self.config.max_attempts => {
                    warn!(
                        backend = backend.name(),
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %msg,
                        "Transient speech backend failure, will retry after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Post-processing shared by every backend: sentinel, length and confidence.
fn finish(
    reply: BackendReply,
    backend: String,
    attempts: u32,
    context: TranscriptionContext,
) -> Result<TranscriptionResult, TranscriptionError> {
    if prompt::is_no_speech(&reply.text) {
        return Err(TranscriptionError::NoSpeech { backend });
    }

    let text = reply.text.trim().to_string();
    let chars = text.chars().count();
    if chars < MIN_TEXT_CHARS {
        return Err(TranscriptionError::TooShort { backend, chars });
    }

    let mut confidence = reply
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);
    if context == TranscriptionContext::Recitation && chars > BOOST_MIN_CHARS {
        confidence = (confidence + RECITATION_BOOST).min(1.0);
    }

    info!(%backend, attempts, chars, confidence, "Transcription complete");

    Ok(TranscriptionResult {
        text,
        confidence,
        backend,
        attempts,
    })
}
