use std::collections::HashMap;

use axum::extract::Multipart;
use recita_transcription::AudioSample;
use serde::Serialize;

use crate::error::ApiError;

/// Compressed speech at roughly 128 kbit/s.
const BYTES_PER_SECOND: f64 = 16_000.0;

/// A multipart form holding one `audio` file and plain text fields.
pub struct Upload {
    pub audio: Option<AudioSample>,
    pub fields: HashMap<String, String>,
}

impl Upload {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut audio = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read multipart field");
            ApiError::BadRequest(format!("Failed to read multipart field: {}", e.body_text()))
        })? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "audio" {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file_name = field.file_name().unwrap_or("recording.webm").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read audio: {}", e.body_text())))?;
                audio = Some(AudioSample {
                    bytes: bytes.to_vec(),
                    mime_type,
                    file_name,
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field {name}: {}", e.body_text())))?;
                fields.insert(name, text);
            }
        }

        Ok(Self { audio, fields })
    }

    pub fn require_audio(&mut self) -> Result<AudioSample, ApiError> {
        self.audio
            .take()
            .ok_or_else(|| ApiError::BadRequest("No audio file provided".to_string()))
    }

    /// Non-blank text field, trimmed.
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize)]
pub struct AudioInfo {
    pub size: usize,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub estimated_duration: f64,
}

impl AudioInfo {
    pub fn of(audio: &AudioSample) -> Self {
        Self {
            size: audio.len(),
            mime_type: audio.mime_type.clone(),
            estimated_duration: (audio.len() as f64 / BYTES_PER_SECOND * 10.0).round() / 10.0,
        }
    }
}
