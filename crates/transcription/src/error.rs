use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Audio payload is empty")]
    EmptyAudio,
    #[error("Audio payload is {size} bytes, limit is {max} bytes")]
    AudioTooLarge { size: usize, max: usize },
    #[error("Backend {backend} rejected the audio: {message}")]
    InvalidAudio { backend: String, message: String },
    #[error("No speech detected by {backend}")]
    NoSpeech { backend: String },
    #[error("Transcription from {backend} is too short ({chars} characters)")]
    TooShort { backend: String, chars: usize },
    #[error("Backend {backend} is rate limited: {message}")]
    RateLimited { backend: String, message: String },
    #[error("No transcription backend available: {}", format_failures(.failures))]
    NoBackendAvailable { failures: Vec<String> },
}

fn format_failures(failures: &[String]) -> String {
    if failures.is_empty() {
        "none configured".to_string()
    } else {
        failures.join("; ")
    }
}

impl TranscriptionError {
    /// Whether the caller's input, not the backends, caused the failure.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TranscriptionError::EmptyAudio
                | TranscriptionError::AudioTooLarge { .. }
                | TranscriptionError::InvalidAudio { .. }
                | TranscriptionError::NoSpeech { .. }
                | TranscriptionError::TooShort { .. }
        )
    }
}
