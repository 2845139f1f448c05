use async_trait::async_trait;
use recita_config::ProviderSettings;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use super::{BackendError, BackendReply, SpeechBackend, SpeechRequest};

/// OpenAI audio transcription endpoint (`/audio/transcriptions`).
///
/// Confidence is derived from the mean token log-probability when the model
/// returns one.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    logprobs: Option<Vec<TokenLogprob>>,
}

#[derive(Debug, Deserialize)]
struct TokenLogprob {
    logprob: f64,
}

impl OpenAiBackend {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// `exp(mean(logprob))`, the geometric-mean token probability.
fn confidence_from_logprobs(logprobs: &[TokenLogprob]) -> Option<f64> {
    if logprobs.is_empty() {
        return None;
    }
    let mean = logprobs.iter().map(|t| t.logprob).sum::<f64>() / logprobs.len() as f64;
    Some(mean.exp().clamp(0.0, 1.0))
}

#[async_trait]
impl SpeechBackend for OpenAiBackend {
    async fn transcribe(&self, request: SpeechRequest<'_>) -> Result<BackendReply, BackendError> {
        let file = Part::bytes(request.audio.bytes.clone())
            .file_name(request.audio.file_name.clone())
            .mime_str(&request.audio.mime_type)
            .map_err(|e| BackendError::InvalidInput(format!("bad MIME type: {e}")))?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("prompt", request.prompt.to_string())
            .text("response_format", "json")
            .text("include[]", "logprobs")
            .text("temperature", "0");
        if let Some(lang) = request.language_hint {
            form = form.text("language", lang.to_string());
        }

        let resp = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status, &body));
        }

        let body: TranscriptionResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        let confidence = body.logprobs.as_deref().and_then(confidence_from_logprobs);
        debug!(text_len = body.text.len(), ?confidence, "OpenAI transcription complete");

        Ok(BackendReply {
            text: body.text,
            confidence,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}
