use std::time::Duration;

use recita_config::TranscriptionSettings;

/// Retry and validation limits for the transcription gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Attempts per backend before falling through to the next one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_backoff: Duration,
    pub max_audio_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_audio_bytes: 10 * 1024 * 1024,
        }
    }
}

impl From<&TranscriptionSettings> for GatewayConfig {
    fn from(settings: &TranscriptionSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_audio_bytes: settings.max_audio_bytes,
        }
    }
}
