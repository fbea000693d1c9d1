use mongodb::{Database, options::{FindOneAndUpdateOptions, ReplaceOptions, ReturnDocument, UpdateModifications}};
use bson::{Bson, Document, doc};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use super::{LedgerStore, prelude::*};
use crate::{model::ledger::LedgerEntry, utils::errors::{ErrorCode, AgriError}};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LedgerDB {
    pub user_id: String,
    pub attempts: u32,
    pub blocked_until: Option<bson::DateTime>,
    pub updated_at: bson::DateTime,
}

impl From<&LedgerEntry> for LedgerDB {
    fn from(entry: &LedgerEntry) -> Self {
        LedgerDB {
            user_id: entry.user_id.clone(),
            attempts: entry.attempts,
            blocked_until: entry.blocked_until.map(bson::DateTime::from_chrono),
            updated_at: bson::DateTime::from_chrono(entry.updated_at),
        }
    }
}

impl From<LedgerDB> for LedgerEntry {
    fn from(entry: LedgerDB) -> Self {
        LedgerEntry {
            user_id: entry.user_id,
            attempts: entry.attempts,
            blocked_until: entry.blocked_until.map(|dt| dt.to_chrono()),
            updated_at: entry.updated_at.to_chrono(),
        }
    }
}

pub struct MongoLedgerStore {
    db: Database,
}

impl MongoLedgerStore {
    pub fn new(db: Database) -> Self {
        MongoLedgerStore { db }
    }

    fn collection(&self) -> mongodb::Collection<LedgerDB> {
        self.db.collection::<LedgerDB>(LEDGER)
    }
}

///
/// Matches an entry that is still in force: never blocked, or blocked until some time after now.
///
fn live_filter(user_id: &str, now: DateTime<Utc>) -> Document {
    doc!{
        USER_ID: user_id,
        "$or": [
            { BLOCKED_UNTIL: Bson::Null },
            { BLOCKED_UNTIL: { "$gt": bson::DateTime::from_chrono(now) } }
        ]
    }
}

///
/// An aggregation-pipeline update so the whole read-modify-write happens inside one
/// document operation on the server:
///
/// 1. A lapsed block voids the entry, so the count restarts from zero.
/// 2. Bump the count.
/// 3. Block the user if the new count has reached the limit.
///
fn failure_pipeline(user_id: &str, now: DateTime<Utc>, max_attempts: u32, block_for: Duration) -> Vec<Document> {
    let now_bson = bson::DateTime::from_chrono(now);
    let block_until = bson::DateTime::from_chrono(now + block_for);

    let lapsed = doc!{
        "$and": [
            { "$ne": [ { "$ifNull": [ "$blocked_until", Bson::Null ] }, Bson::Null ] },
            { "$lte": [ "$blocked_until", now_bson ] }
        ]
    };

    vec![
        doc!{ "$set": {
            ATTEMPTS: { "$cond": [ lapsed.clone(), 0, { "$ifNull": [ "$attempts", 0 ] } ] },
            BLOCKED_UNTIL: { "$cond": [ lapsed, Bson::Null, { "$ifNull": [ "$blocked_until", Bson::Null ] } ] },
        }},
        doc!{ "$set": {
            USER_ID: user_id,
            ATTEMPTS: { "$add": [ "$attempts", 1 ] },
            UPDATED_AT: now_bson,
        }},
        doc!{ "$set": {
            BLOCKED_UNTIL: { "$cond": [ { "$gte": [ "$attempts", max_attempts as i64 ] }, block_until, "$blocked_until" ] },
        }},
    ]
}

#[async_trait]
impl LedgerStore for MongoLedgerStore {

    async fn get(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<LedgerEntry>, AgriError> {
        Ok(self.collection().find_one(live_filter(user_id, now), None)
            .await
            .map_err(AgriError::from)?
            .map(LedgerEntry::from))
    }

    async fn upsert(&self, entry: &LedgerEntry) -> Result<(), AgriError> {
        let filter = doc!{ USER_ID: &entry.user_id };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection().replace_one(filter, LedgerDB::from(entry), options)
            .await
            .map_err(AgriError::from)?;

        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), AgriError> {
        self.collection().delete_one(doc!{ USER_ID: user_id }, None)
            .await
            .map_err(AgriError::from)?;

        Ok(())
    }

    async fn record_failure(&self, user_id: &str, now: DateTime<Utc>, max_attempts: u32, block_for: Duration)
        -> Result<LedgerEntry, AgriError> {

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let update = UpdateModifications::Pipeline(failure_pipeline(user_id, now, max_attempts, block_for));

        match self.collection().find_one_and_update(doc!{ USER_ID: user_id }, update, options)
            .await
            .map_err(AgriError::from)? {

            Some(entry) => Ok(LedgerEntry::from(entry)),
            None => Err(ErrorCode::MongoDBError.with_msg(&format!("The attempt ledger upsert for user {} returned nothing", user_id))),
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AgriError> {
        let filter = doc!{ BLOCKED_UNTIL: { "$lte": bson::DateTime::from_chrono(now) } };

        let result = self.collection().delete_many(filter, None)
            .await
            .map_err(AgriError::from)?;

        Ok(result.deleted_count)
    }
}
