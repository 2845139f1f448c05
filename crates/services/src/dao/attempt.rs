use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use recita_db::models::RecitationAttempt;

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};
use crate::store::AttemptStore;

pub struct AttemptDao {
    pub base: BaseDao<RecitationAttempt>,
}

impl AttemptDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, RecitationAttempt::COLLECTION),
        }
    }
}

#[async_trait]
impl AttemptStore for AttemptDao {
    async fn insert(&self, mut attempt: RecitationAttempt) -> DaoResult<RecitationAttempt> {
        attempt.id = None;
        let id = self.base.insert_one(&attempt).await?;
        attempt.id = Some(id);
        Ok(attempt)
    }

    async fn find_for_user(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<RecitationAttempt>> {
        self.base
            .find_paginated(
                doc! { "user_id": user_id },
                Some(doc! { "created_at": -1 }),
                params,
            )
            .await
    }

    async fn find_for_user_by_id(&self, user_id: &str, id: ObjectId) -> DaoResult<RecitationAttempt> {
        self.base
            .find_one(doc! { "_id": id, "user_id": user_id })
            .await?
            .ok_or(super::base::DaoError::NotFound)
    }
}
