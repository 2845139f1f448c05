use std::collections::BTreeSet;

use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Per-(user, chapter) progress rollup. Mutated once per attempt, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryLedgerEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub chapter: u16,
    #[serde(default)]
    pub total_attempts: u32,
    #[serde(default)]
    pub best_score: u8,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub verses_attempted: BTreeSet<u16>,
    #[serde(default)]
    pub verses_mastered: BTreeSet<u16>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl MasteryLedgerEntry {
    pub const COLLECTION: &'static str = "mastery_ledger";

    pub fn new(user_id: impl Into<String>, chapter: u16) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            user_id: user_id.into(),
            chapter,
            total_attempts: 0,
            best_score: 0,
            average_score: 0.0,
            verses_attempted: BTreeSet::new(),
            verses_mastered: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Folds one attempt's score into the entry.
    ///
    /// Every verse in `verses` is marked attempted; they are also marked
    /// mastered when `score >= threshold`.
    pub fn record(&mut self, score: u8, verses: &[u16], threshold: u8) {
        let old_count = self.total_attempts as f64;
        self.total_attempts += 1;
        self.best_score = self.best_score.max(score);
        self.average_score =
            (self.average_score * old_count + score as f64) / self.total_attempts as f64;
        self.verses_attempted.extend(verses.iter().copied());
        if score >= threshold {
            self.verses_mastered.extend(verses.iter().copied());
        }
        self.updated_at = DateTime::now();
    }
}
