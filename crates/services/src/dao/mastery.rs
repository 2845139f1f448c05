use async_trait::async_trait;
use bson::{DateTime, Document, doc};
use mongodb::Database;
use mongodb::options::ReturnDocument;
use recita_db::models::MasteryLedgerEntry;

use super::base::{BaseDao, DaoError, DaoResult, is_duplicate_key};
use crate::store::MasteryStore;

pub struct MasteryDao {
    pub base: BaseDao<MasteryLedgerEntry>,
}

impl MasteryDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, MasteryLedgerEntry::COLLECTION),
        }
    }
}

/// Single-stage update pipeline applying one attempt to a ledger entry.
///
/// Every expression in a `$set` stage reads the pre-update document, so the
/// running average uses the old count and old average.
fn ledger_update_pipeline(
    user_id: &str,
    chapter: u16,
    score: u8,
    verses: &[u16],
    threshold: u8,
) -> Vec<Document> {
    let attempted: Vec<i32> = verses.iter().map(|&v| v as i32).collect();
    let mastered: Vec<i32> = if score >= threshold {
        attempted.clone()
    } else {
        Vec::new()
    };
    let score = score as i32;
    let now = DateTime::now();

    vec![doc! {
        "$set": {
            "user_id": user_id,
            "chapter": chapter as i32,
            "total_attempts": { "$add": [{ "$ifNull": ["$total_attempts", 0] }, 1] },
            "best_score": { "$max": [{ "$ifNull": ["$best_score", 0] }, score] },
            "average_score": {
                "$divide": [
                    {
                        "$add": [
                            {
                                "$multiply": [
                                    { "$ifNull": ["$average_score", 0.0] },
                                    { "$ifNull": ["$total_attempts", 0] }
                                ]
                            },
                            score
                        ]
                    },
                    { "$add": [{ "$ifNull": ["$total_attempts", 0] }, 1] }
                ]
            },
            "verses_attempted": { "$setUnion": [{ "$ifNull": ["$verses_attempted", []] }, attempted] },
            "verses_mastered": { "$setUnion": [{ "$ifNull": ["$verses_mastered", []] }, mastered] },
            "created_at": { "$ifNull": ["$created_at", now] },
            "updated_at": now,
        }
    }]
}

#[async_trait]
impl MasteryStore for MasteryDao {
    async fn record(
        &self,
        user_id: &str,
        chapter: u16,
        score: u8,
        verses: &[u16],
        threshold: u8,
    ) -> DaoResult<MasteryLedgerEntry> {
        let mut retried = false;
        loop {
            let result = self
                .base
                .collection()
                .find_one_and_update(
                    doc! { "user_id": user_id, "chapter": chapter as i32 },
                    ledger_update_pipeline(user_id, chapter, score, verses, threshold),
                )
                .upsert(true)
                .return_document(ReturnDocument::After)
                .await;
            match result {
                Ok(entry) => return entry.ok_or(DaoError::NotFound),
                Err(e) if !retried && is_duplicate_key(&e) => {
                    tracing::debug!(user_id, chapter, "Ledger upsert raced, retrying");
                    retried = true;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn find_for_user(&self, user_id: &str) -> DaoResult<Vec<MasteryLedgerEntry>> {
        self.base
            .find_many(doc! { "user_id": user_id }, Some(doc! { "chapter": 1 }))
            .await
    }

    async fn find_chapter(&self, user_id: &str, chapter: u16) -> DaoResult<MasteryLedgerEntry> {
        self.base
            .find_one(doc! { "user_id": user_id, "chapter": chapter as i32 })
            .await?
            .ok_or(DaoError::NotFound)
    }
}
