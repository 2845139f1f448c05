use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{MasteryLedgerEntry, RecitationAttempt};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Attempt history, newest first per user
    create_indexes(
        db,
        RecitationAttempt::COLLECTION,
        vec![index(bson::doc! { "user_id": 1, "created_at": -1 })],
    )
    .await?;

    // One ledger entry per (user, chapter); the upsert relies on this
    create_indexes(
        db,
        MasteryLedgerEntry::COLLECTION,
        vec![index_unique(bson::doc! { "user_id": 1, "chapter": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    let coll = db.collection::<bson::Document>(collection);
    match coll.create_indexes(indexes.clone()).await {
        Ok(_) => {
            info!(collection, "Indexes created");
            Ok(())
        }
        Err(e) => {
            // IndexKeySpecsConflict (code 86): same index name, different options.
            // Drop and recreate.
            if let mongodb::error::ErrorKind::Command(ref cmd_err) = *e.kind
                && cmd_err.code == 86
            {
                tracing::warn!(
                    collection,
                    "Index conflict detected, dropping conflicting indexes and retrying"
                );
                coll.drop_indexes().await?;
                coll.create_indexes(indexes).await?;
                info!(collection, "Indexes recreated after conflict resolution");
                return Ok(());
            }
            Err(e)
        }
    }
}
