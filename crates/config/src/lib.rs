use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub verses: VerseSettings,
    pub transcription: TranscriptionSettings,
    pub judge: JudgeSettings,
    pub mastery: MasterySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    /// Expose internal error detail in API responses.
    pub dev_mode: bool,
    /// Deadline for one full recitation run (transcribe + assess + record).
    pub request_timeout_secs: u64,
    /// HTTP body limit for audio uploads. Kept above the gateway's own
    /// audio ceiling so oversized audio is reported as a size error.
    pub max_upload_bytes: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            dev_mode: false,
            request_timeout_secs: 120,
            max_upload_bytes: 12 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// When false the service keeps attempts and ledger entries in memory.
    pub enabled: bool,
    pub url: String,
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "mongodb://localhost:27017".to_string(),
            name: "recita".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerseSettings {
    /// Root directory holding `{variant}/{chapter:03}.json` record sets.
    pub data_dir: String,
}

impl Default for VerseSettings {
    fn default() -> Self {
        Self {
            data_dir: "data/verses".to_string(),
        }
    }
}

/// Credentials and endpoint for one remote model provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl ProviderSettings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn with_defaults(model: &str, base_url: &str) -> Self {
        Self {
            api_key: String::new(),
            model: model.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Fallback order. The caller's selected backend is always tried first.
    pub priority: Vec<String>,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_audio_bytes: usize,
    pub http_timeout_secs: u64,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            priority: vec!["gemini".to_string(), "openai".to_string()],
            max_attempts: 3,
            initial_backoff_ms: 2000,
            max_audio_bytes: 10 * 1024 * 1024,
            http_timeout_secs: 60,
            openai: ProviderSettings::with_defaults(
                "gpt-4o-transcribe",
                "https://api.openai.com/v1",
            ),
            gemini: ProviderSettings::with_defaults(
                "gemini-2.0-flash",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeSettings {
    pub default_backend: String,
    pub http_timeout_secs: u64,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            default_backend: "gemini".to_string(),
            http_timeout_secs: 60,
            openai: ProviderSettings::with_defaults("gpt-4o-mini", "https://api.openai.com/v1"),
            gemini: ProviderSettings::with_defaults(
                "gemini-2.0-flash",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterySettings {
    /// Minimum score at which every verse of an attempt counts as mastered.
    pub threshold: u8,
}

impl Default for MasterySettings {
    fn default() -> Self {
        Self { threshold: 90 }
    }
}

impl Settings {
    /// Loads `{dir}/default.toml`, an optional `{dir}/local.toml`, then
    /// `RECITA__SECTION__KEY` environment variables.
    pub fn load_from(dir: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(&format!("{dir}/default")).required(false))
            .add_source(File::with_name(&format!("{dir}/local")).required(false))
            .add_source(
                Environment::with_prefix("RECITA")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("transcription.priority")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
