use std::collections::BTreeMap;
use std::sync::Arc;

use bson::{DateTime, oid::ObjectId};
use recita_db::chapters;
use recita_db::models::{
    AssessmentResult, MasteryLedgerEntry, RecitationAttempt, RecordingMetadata,
    TranscriptionResult, VerseRange, VerseRecord,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::dao::base::{DaoError, PaginatedResult, PaginationParams};
use crate::passage;
use crate::store::{AttemptStore, MasteryStore};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid attempt: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] DaoError),
}

/// A ledger update that failed after the attempt was stored.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerFailure {
    pub chapter: u16,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub attempt: RecitationAttempt,
    pub ledger: Vec<MasteryLedgerEntry>,
    pub ledger_errors: Vec<LedgerFailure>,
}

impl RecordOutcome {
    pub fn attempt_id(&self) -> Option<ObjectId> {
        self.attempt.id
    }

    pub fn ledger_updated(&self) -> bool {
        self.ledger_errors.is_empty()
    }
}

/// Verse numbers of every chapter the range touches, for the ledger.
///
/// Verses beyond a chapter's count in the Hafs table are dropped, including
/// on the end chapter. Used for attempts submitted without a resolved
/// passage.
pub fn chapter_verses(range: &VerseRange) -> Vec<(u16, Vec<u16>)> {
    range
        .chapters()
        .map(|chapter| {
            let count = chapters::verse_count(chapter).unwrap_or(0);
            (chapter, range.verses_in_chapter(chapter, count))
        })
        .filter(|(_, verses)| !verses.is_empty())
        .collect()
}

/// Groups resolved verse records by chapter, ascending.
pub fn passage_verses(verses: &[VerseRecord]) -> Vec<(u16, Vec<u16>)> {
    let mut grouped: BTreeMap<u16, Vec<u16>> = BTreeMap::new();
    for record in verses {
        grouped.entry(record.chapter).or_default().push(record.verse);
    }
    grouped.into_iter().collect()
}

/// Persists completed attempts and rolls them into the mastery ledger.
///
/// The attempt is written first and is authoritative: ledger failures are
/// reported in the outcome, never propagated.
pub struct AttemptRecorder {
    attempts: Arc<dyn AttemptStore>,
    mastery: Arc<dyn MasteryStore>,
    threshold: u8,
}

impl AttemptRecorder {
    pub fn new(attempts: Arc<dyn AttemptStore>, mastery: Arc<dyn MasteryStore>, threshold: u8) -> Self {
        Self {
            attempts,
            mastery,
            threshold,
        }
    }

    /// Records an attempt whose verses are derived from the range alone.
    pub async fn record(
        &self,
        user_id: &str,
        range: VerseRange,
        recording: RecordingMetadata,
        transcription: TranscriptionResult,
        assessment: AssessmentResult,
    ) -> Result<RecordOutcome, RecordError> {
        let verses = chapter_verses(&range);
        self.record_verses(user_id, range, verses, recording, transcription, assessment)
            .await
    }

    /// Records an attempt against the verses actually resolved for it.
    pub async fn record_verses(
        &self,
        user_id: &str,
        range: VerseRange,
        verses: Vec<(u16, Vec<u16>)>,
        recording: RecordingMetadata,
        transcription: TranscriptionResult,
        assessment: AssessmentResult,
    ) -> Result<RecordOutcome, RecordError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(RecordError::InvalidInput("user_id is required".to_string()));
        }
        passage::validate(&range).map_err(|e| RecordError::InvalidInput(e.to_string()))?;

        let attempt = self
            .attempts
            .insert(RecitationAttempt {
                id: None,
                user_id: user_id.to_string(),
                verse_range: range,
                recording,
                transcription: transcription.clamped(),
                assessment: assessment.clamped(),
                created_at: DateTime::now(),
            })
            .await?;
        let score = attempt.assessment.score;

        let mut ledger = Vec::new();
        let mut ledger_errors = Vec::new();
        for (chapter, verses) in verses {
            match self
                .mastery
                .record(user_id, chapter, score, &verses, self.threshold)
                .await
            {
                Ok(entry) => ledger.push(entry),
                Err(e) => {
                    warn!(user_id, chapter, error = %e, "Mastery ledger update failed");
                    ledger_errors.push(LedgerFailure {
                        chapter,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            user_id,
            attempt_id = ?attempt.id,
            reference = %range.reference_label(),
            score,
            ledger_updated = ledger_errors.is_empty(),
            "Attempt recorded"
        );
        Ok(RecordOutcome {
            attempt,
            ledger,
            ledger_errors,
        })
    }

    pub async fn history(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> Result<PaginatedResult<RecitationAttempt>, RecordError> {
        Ok(self.attempts.find_for_user(user_id, params).await?)
    }

    pub async fn attempt(&self, user_id: &str, id: ObjectId) -> Result<RecitationAttempt, RecordError> {
        Ok(self.attempts.find_for_user_by_id(user_id, id).await?)
    }

    pub async fn mastery(&self, user_id: &str) -> Result<Vec<MasteryLedgerEntry>, RecordError> {
        Ok(self.mastery.find_for_user(user_id).await?)
    }

    pub async fn mastery_chapter(
        &self,
        user_id: &str,
        chapter: u16,
    ) -> Result<MasteryLedgerEntry, RecordError> {
        Ok(self.mastery.find_chapter(user_id, chapter).await?)
    }
}
