use std::net::SocketAddr;
use std::sync::Arc;

use recita_api::state::{AppState, Components};
use recita_config::Settings;
use recita_services::JudgeBackend;
use recita_services::store::{MemoryAttemptStore, MemoryMasteryStore};
use recita_transcription::SpeechBackend;

use super::fakes::{FakeJudge, ScriptedSpeech};
use super::verses::{FATIHA_FIRST_VERSE, seeded_source};

pub const GOOD_JUDGEMENT: &str = r#"Assessment follows.
{"score": 92, "feedback": "Clear and fluent.",
 "accuracyDetails": {"overallAccuracy": 94, "pronunciation": 90, "completeness": 100, "correctOrder": 100},
 "mistakes": [{"type": "incorrect", "description": "Short vowel on the last word"}],
 "suggestions": ["Hold the madd for two counts"], "confidence": 0.85}"#;

pub struct TestBackends {
    pub speech: Vec<Arc<ScriptedSpeech>>,
    pub judges: Vec<Arc<FakeJudge>>,
}

impl Default for TestBackends {
    fn default() -> Self {
        Self {
            speech: vec![ScriptedSpeech::replying("gemini", FATIHA_FIRST_VERSE)],
            judges: vec![FakeJudge::replying("gemini", GOOD_JUDGEMENT)],
        }
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub attempts: Arc<MemoryAttemptStore>,
    pub speech: Vec<Arc<ScriptedSpeech>>,
    pub judges: Vec<Arc<FakeJudge>>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestBackends::default()).await
    }

    pub async fn spawn_with(backends: TestBackends) -> Self {
        Self::spawn_configured(backends, |_| {}).await
    }

    /// Spawns with test defaults, then lets `configure` adjust the settings.
    pub async fn spawn_configured(backends: TestBackends, configure: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = Settings::default();
        settings.database.enabled = false;
        settings.transcription.initial_backoff_ms = 0;
        settings.judge.default_backend = "gemini".to_string();
        configure(&mut settings);

        let attempts = Arc::new(MemoryAttemptStore::new());
        let state = AppState::new(
            settings,
            Components {
                verses: Arc::new(seeded_source()),
                speech: backends
                    .speech
                    .iter()
                    .map(|b| b.clone() as Arc<dyn SpeechBackend>)
                    .collect(),
                judges: backends
                    .judges
                    .iter()
                    .map(|j| j.clone() as Arc<dyn JudgeBackend>)
                    .collect(),
                attempts: attempts.clone(),
                mastery: Arc::new(MemoryMasteryStore::new()),
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = recita_api::build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: reqwest::Client::new(),
            attempts,
            speech: backends.speech,
            judges: backends.judges,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn audio_form(&self, bytes: usize) -> reqwest::multipart::Form {
        let part = reqwest::multipart::Part::bytes(vec![7u8; bytes])
            .file_name("recitation.webm")
            .mime_str("audio/webm")
            .unwrap();
        reqwest::multipart::Form::new().part("audio", part)
    }
}
