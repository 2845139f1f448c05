//! Storage seams for attempts and the mastery ledger.
//!
//! MongoDB DAOs implement these in production; the in-memory stores back
//! tests and database-less runs.

pub mod memory;

use async_trait::async_trait;
use bson::oid::ObjectId;
use recita_db::models::{MasteryLedgerEntry, RecitationAttempt};

use crate::dao::base::{DaoResult, PaginatedResult, PaginationParams};

pub use memory::{MemoryAttemptStore, MemoryMasteryStore};

#[async_trait]
pub trait AttemptStore: Send + Sync + 'static {
    /// Persists a new attempt and returns it with its id assigned.
    async fn insert(&self, attempt: RecitationAttempt) -> DaoResult<RecitationAttempt>;

    /// A user's attempts, newest first.
    async fn find_for_user(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<RecitationAttempt>>;

    async fn find_for_user_by_id(&self, user_id: &str, id: ObjectId) -> DaoResult<RecitationAttempt>;
}

#[async_trait]
pub trait MasteryStore: Send + Sync + 'static {
    /// Folds one score into the (user, chapter) entry as a single atomic
    /// read-modify-write, creating the entry if needed.
    async fn record(
        &self,
        user_id: &str,
        chapter: u16,
        score: u8,
        verses: &[u16],
        threshold: u8,
    ) -> DaoResult<MasteryLedgerEntry>;

    /// All of a user's entries, ascending by chapter.
    async fn find_for_user(&self, user_id: &str) -> DaoResult<Vec<MasteryLedgerEntry>>;

    async fn find_chapter(&self, user_id: &str, chapter: u16) -> DaoResult<MasteryLedgerEntry>;
}
