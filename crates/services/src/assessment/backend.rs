use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recita_config::{JudgeSettings, ProviderSettings};
use recita_transcription::BackendError;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// A generative text model that grades transcripts.
#[async_trait]
pub trait JudgeBackend: Send + Sync + 'static {
    /// Sends one prompt and returns the model's raw text reply.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;

    fn name(&self) -> &str;
}

async fn read_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, BackendError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(BackendError::from_status(status, &body));
    }
    resp.json()
        .await
        .map_err(|e| BackendError::Malformed(e.to_string()))
}

/// OpenAI chat completions in JSON-object mode.
pub struct OpenAiJudge {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiJudge {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn chat_text(body: ChatResponse) -> Result<String, BackendError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| BackendError::Malformed("no completion content".to_string()))
}

#[async_trait]
impl JudgeBackend for OpenAiJudge {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": { "type": "json_object" },
            "temperature": 0.2,
        });
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        let text = chat_text(read_json(resp).await?)?;
        debug!(reply_len = text.len(), "OpenAI judge replied");
        Ok(text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Gemini `generateContent` with a JSON response MIME type.
pub struct GeminiJudge {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiJudge {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn candidate_text(body: GenerateResponse) -> Result<String, BackendError> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(BackendError::Malformed("empty candidate".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl JudgeBackend for GeminiJudge {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.2,
                "responseMimeType": "application/json",
            }
        });
        let resp = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        let text = candidate_text(read_json(resp).await?)?;
        debug!(reply_len = text.len(), "Gemini judge replied");
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Builds every judge whose credentials are present.
pub fn build_judges(settings: &JudgeSettings) -> Result<Vec<Arc<dyn JudgeBackend>>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .build()?;

    let mut judges: Vec<Arc<dyn JudgeBackend>> = Vec::new();
    if settings.gemini.is_configured() {
        judges.push(Arc::new(GeminiJudge::new(client.clone(), &settings.gemini)));
    } else {
        info!(backend = "gemini", "Judge has no credentials, skipping");
    }
    if settings.openai.is_configured() {
        judges.push(Arc::new(OpenAiJudge::new(client, &settings.openai)));
    } else {
        info!(backend = "openai", "Judge has no credentials, skipping");
    }
    Ok(judges)
}
