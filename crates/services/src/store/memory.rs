use async_trait::async_trait;
use bson::oid::ObjectId;
use dashmap::DashMap;
use recita_db::models::{MasteryLedgerEntry, RecitationAttempt};

use super::{AttemptStore, MasteryStore};
use crate::dao::base::{DaoError, DaoResult, PaginatedResult, PaginationParams};

/// Attempt history kept in process memory, keyed by user id.
#[derive(Default)]
pub struct MemoryAttemptStore {
    attempts: DashMap<String, Vec<RecitationAttempt>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_for_user(&self, user_id: &str) -> usize {
        self.attempts.get(user_id).map(|a| a.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn insert(&self, mut attempt: RecitationAttempt) -> DaoResult<RecitationAttempt> {
        attempt.id = Some(ObjectId::new());
        self.attempts
            .entry(attempt.user_id.clone())
            .or_default()
            .push(attempt.clone());
        Ok(attempt)
    }

    async fn find_for_user(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<RecitationAttempt>> {
        let all: Vec<RecitationAttempt> = self
            .attempts
            .get(user_id)
            .map(|a| a.iter().rev().cloned().collect())
            .unwrap_or_default();
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(params.skip() as usize)
            .take(params.per_page() as usize)
            .collect();
        Ok(PaginatedResult::new(items, total, params))
    }

    async fn find_for_user_by_id(&self, user_id: &str, id: ObjectId) -> DaoResult<RecitationAttempt> {
        self.attempts
            .get(user_id)
            .and_then(|a| a.iter().find(|x| x.id == Some(id)).cloned())
            .ok_or(DaoError::NotFound)
    }
}

/// Mastery ledger kept in process memory. Each update runs under the
/// entry's shard lock, so concurrent attempts never lose updates.
#[derive(Default)]
pub struct MemoryMasteryStore {
    entries: DashMap<(String, u16), MasteryLedgerEntry>,
}

impl MemoryMasteryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MasteryStore for MemoryMasteryStore {
    async fn record(
        &self,
        user_id: &str,
        chapter: u16,
        score: u8,
        verses: &[u16],
        threshold: u8,
    ) -> DaoResult<MasteryLedgerEntry> {
        let mut entry = self
            .entries
            .entry((user_id.to_string(), chapter))
            .or_insert_with(|| {
                let mut e = MasteryLedgerEntry::new(user_id, chapter);
                e.id = Some(ObjectId::new());
                e
            });
        entry.record(score, verses, threshold);
        Ok(entry.clone())
    }

    async fn find_for_user(&self, user_id: &str) -> DaoResult<Vec<MasteryLedgerEntry>> {
        let mut entries: Vec<MasteryLedgerEntry> = self
            .entries
            .iter()
            .filter(|e| e.key().0 == user_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by_key(|e| e.chapter);
        Ok(entries)
    }

    async fn find_chapter(&self, user_id: &str, chapter: u16) -> DaoResult<MasteryLedgerEntry> {
        self.entries
            .get(&(user_id.to_string(), chapter))
            .map(|e| e.value().clone())
            .ok_or(DaoError::NotFound)
    }
}
