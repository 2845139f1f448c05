use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use recita_config::ProviderSettings;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{BackendError, BackendReply, SpeechBackend, SpeechRequest};

/// Gemini multimodal `generateContent` with inline audio.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
    avg_logprobs: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

impl GeminiBackend {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Extracts the concatenated text of the first candidate.
fn reply_from_response(body: GenerateResponse) -> Result<BackendReply, BackendError> {
    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::Malformed("no candidates".to_string()))?;

    if let Some(reason) = candidate.finish_reason.as_deref()
        && matches!(reason, "SAFETY" | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST")
    {
        return Err(BackendError::Malformed(format!("generation blocked: {reason}")));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    Ok(BackendReply {
        text,
        confidence: candidate.avg_logprobs.map(|lp| lp.exp().clamp(0.0, 1.0)),
    })
}

#[async_trait]
impl SpeechBackend for GeminiBackend {
    async fn transcribe(&self, request: SpeechRequest<'_>) -> Result<BackendReply, BackendError> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": request.prompt },
                    {
                        "inline_data": {
                            "mime_type": request.audio.mime_type,
                            "data": STANDARD.encode(&request.audio.bytes),
                        }
                    }
                ]
            }],
            "generationConfig": { "temperature": 0.0 }
        });

        let resp = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status, &body));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        let reply = reply_from_response(parsed)?;
        debug!(text_len = reply.text.len(), "Gemini transcription complete");
        Ok(reply)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
