use std::sync::Arc;
use std::time::Duration;

use recita_config::Settings;
use recita_services::assessment::{self, AssessmentJudge, JudgeBackend};
use recita_services::dao::{AttemptDao, MasteryDao};
use recita_services::passage::{FsVerseSource, RangeResolver, VerseSource};
use recita_services::pipeline::RecitationPipeline;
use recita_services::recorder::AttemptRecorder;
use recita_services::store::{AttemptStore, MasteryStore, MemoryAttemptStore, MemoryMasteryStore};
use recita_transcription::{GatewayConfig, SpeechBackend, TranscriptionGateway, asr};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub resolver: Arc<RangeResolver>,
    pub gateway: Arc<TranscriptionGateway>,
    pub judge: Arc<AssessmentJudge>,
    pub recorder: Arc<AttemptRecorder>,
    pub pipeline: Arc<RecitationPipeline>,
}

/// Injected collaborators; swapped for fakes in tests.
pub struct Components {
    pub verses: Arc<dyn VerseSource>,
    pub speech: Vec<Arc<dyn SpeechBackend>>,
    pub judges: Vec<Arc<dyn JudgeBackend>>,
    pub attempts: Arc<dyn AttemptStore>,
    pub mastery: Arc<dyn MasteryStore>,
}

impl AppState {
    pub fn new(settings: Settings, components: Components) -> Self {
        let resolver = Arc::new(RangeResolver::new(components.verses));
        let gateway = Arc::new(TranscriptionGateway::new(
            components.speech,
            GatewayConfig::from(&settings.transcription),
        ));
        let judge = Arc::new(AssessmentJudge::new(
            components.judges,
            settings.judge.default_backend.clone(),
        ));
        let recorder = Arc::new(AttemptRecorder::new(
            components.attempts,
            components.mastery,
            settings.mastery.threshold,
        ));
        let pipeline = Arc::new(RecitationPipeline::new(
            resolver.clone(),
            gateway.clone(),
            judge.clone(),
            recorder.clone(),
            Duration::from_secs(settings.app.request_timeout_secs),
        ));

        Self {
            settings: Arc::new(settings),
            resolver,
            gateway,
            judge,
            recorder,
            pipeline,
        }
    }

    /// Builds production collaborators: filesystem verses, credentialed HTTP
    /// backends and MongoDB stores (in-memory when the database is disabled).
    pub async fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let speech = asr::build_backends(&settings.transcription)?;
        if speech.is_empty() {
            warn!("No speech backend has credentials; transcription requests will fail");
        }
        let judges = assessment::build_judges(&settings.judge)?;
        if judges.is_empty() {
            warn!("No judge backend has credentials; assessment requests will fail");
        }

        let (attempts, mastery): (Arc<dyn AttemptStore>, Arc<dyn MasteryStore>) =
            if settings.database.enabled {
                let db = recita_db::connect(&settings.database).await?;
                recita_db::indexes::ensure_indexes(&db).await?;
                (Arc::new(AttemptDao::new(&db)), Arc::new(MasteryDao::new(&db)))
            } else {
                info!("Database disabled, attempts are kept in memory");
                (
                    Arc::new(MemoryAttemptStore::new()),
                    Arc::new(MemoryMasteryStore::new()),
                )
            };

        let verses = Arc::new(FsVerseSource::new(&settings.verses.data_dir));
        Ok(Self::new(
            settings,
            Components {
                verses,
                speech,
                judges,
                attempts,
                mastery,
            },
        ))
    }
}
