use std::sync::Arc;
use std::time::{Duration, Instant};

use recita_db::models::{AssessmentResult, RecordingMetadata, TranscriptionResult, VerseRange};
use recita_transcription::{
    AudioSample, TranscriptionContext, TranscriptionError, TranscriptionGateway,
    TranscriptionRequest,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::assessment::{AssessmentJudge, AssessmentRequest, JudgeError};
use crate::passage::{self, RangeError, RangeResolver, ResolvedPassage};
use crate::recorder::{self, AttemptRecorder, RecordError, RecordOutcome};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
    #[error(transparent)]
    Judge(#[from] JudgeError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("Recitation did not complete within {0:?}")]
    Timeout(Duration),
}

/// One end-to-end recitation run.
pub struct RecitationRequest {
    pub user_id: String,
    pub range: VerseRange,
    pub audio: AudioSample,
    pub transcription_backend: Option<String>,
    pub judge_backend: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug)]
pub struct RecitationOutcome {
    pub passage: ResolvedPassage,
    pub transcription: TranscriptionResult,
    pub assessment: AssessmentResult,
    pub record: RecordOutcome,
}

/// Resolve and transcribe concurrently, grade, then persist.
///
/// The deadline bounds the upstream stages only. Persistence starts once all
/// of them have produced a complete result, so a timed-out or failed run
/// never leaves a partial attempt behind.
pub struct RecitationPipeline {
    resolver: Arc<RangeResolver>,
    gateway: Arc<TranscriptionGateway>,
    judge: Arc<AssessmentJudge>,
    recorder: Arc<AttemptRecorder>,
    timeout: Duration,
}

impl RecitationPipeline {
    pub fn new(
        resolver: Arc<RangeResolver>,
        gateway: Arc<TranscriptionGateway>,
        judge: Arc<AssessmentJudge>,
        recorder: Arc<AttemptRecorder>,
        timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            gateway,
            judge,
            recorder,
            timeout,
        }
    }

    pub async fn run(&self, request: RecitationRequest) -> Result<RecitationOutcome, PipelineError> {
        if request.user_id.trim().is_empty() {
            return Err(RecordError::InvalidInput("user_id is required".to_string()).into());
        }
        // Reject bad ranges before paying for a transcription.
        passage::validate(&request.range)?;

        let started = Instant::now();
        let recording = RecordingMetadata {
            duration_secs: None,
            size_bytes: Some(request.audio.len() as u64),
            mime_type: Some(request.audio.mime_type.clone()),
        };
        let judge_backend = request.judge_backend.clone();

        let upstream = self.upstream(&request, judge_backend);
        let (passage, transcription, assessment) = match tokio::time::timeout(self.timeout, upstream).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    user_id = %request.user_id,
                    reference = %request.range.reference_label(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Recitation timed out before assessment completed"
                );
                return Err(PipelineError::Timeout(self.timeout));
            }
        };

        let record = self
            .recorder
            .record_verses(
                &request.user_id,
                request.range,
                recorder::passage_verses(&passage.verses),
                recording,
                transcription.clone(),
                assessment.clone(),
            )
            .await?;

        info!(
            user_id = %request.user_id,
            reference = %passage.reference,
            backend = %transcription.backend,
            score = assessment.score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recitation complete"
        );
        Ok(RecitationOutcome {
            passage,
            transcription,
            assessment,
            record,
        })
    }

    async fn upstream(
        &self,
        request: &RecitationRequest,
        judge: Option<String>,
    ) -> Result<(ResolvedPassage, TranscriptionResult, AssessmentResult), PipelineError> {
        let transcription_request = TranscriptionRequest {
            audio: request.audio.clone(),
            backend: request.transcription_backend.clone(),
            language_hint: request.language.clone(),
            context: TranscriptionContext::Recitation,
            expected_reference: Some(request.range.reference_label()),
        };

        let (passage, transcription) = tokio::join!(
            self.resolver.resolve(&request.range),
            self.gateway.transcribe(transcription_request),
        );
        let passage = passage?;
        let transcription = transcription?;

        let assessment = self
            .judge
            .assess(&AssessmentRequest {
                transcript: transcription.text.clone(),
                original_text: passage.text.clone(),
                original_diacritical_text: passage.text_diacritical.clone(),
                reference: passage.reference.clone(),
                judge,
                verse_count: Some(passage.verse_count),
            })
            .await?;
        Ok((passage, transcription, assessment))
    }
}
