use mongodb::{Database, options::ReplaceOptions};
use bson::doc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{OtpStore, prelude::*};
use crate::{model::otp::OtpRecord, utils::errors::AgriError};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OtpDB {
    pub user_id: String,
    pub email: String,
    pub otp_phc: String,
    pub created_at: bson::DateTime,
    pub expires_at: bson::DateTime,
}

impl From<&OtpRecord> for OtpDB {
    fn from(record: &OtpRecord) -> Self {
        OtpDB {
            user_id: record.user_id.clone(),
            email: record.email.clone(),
            otp_phc: record.otp_phc.clone(),
            created_at: bson::DateTime::from_chrono(record.created_at),
            expires_at: bson::DateTime::from_chrono(record.expires_at),
        }
    }
}

impl From<OtpDB> for OtpRecord {
    fn from(record: OtpDB) -> Self {
        OtpRecord {
            user_id: record.user_id,
            email: record.email,
            otp_phc: record.otp_phc,
            created_at: record.created_at.to_chrono(),
            expires_at: record.expires_at.to_chrono(),
        }
    }
}

pub struct MongoOtpStore {
    db: Database,
}

impl MongoOtpStore {
    pub fn new(db: Database) -> Self {
        MongoOtpStore { db }
    }

    fn collection(&self) -> mongodb::Collection<OtpDB> {
        self.db.collection::<OtpDB>(OTPS)
    }
}

#[async_trait]
impl OtpStore for MongoOtpStore {

    ///
    /// Only a record that hasn't expired is returned - the TTL index may not have removed it yet.
    ///
    async fn get(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<OtpRecord>, AgriError> {
        let filter = doc!{
            USER_ID: user_id,
            EXPIRES_AT: { "$gt": bson::DateTime::from_chrono(now) }
        };

        Ok(self.collection().find_one(filter, None)
            .await
            .map_err(AgriError::from)?
            .map(OtpRecord::from))
    }

    async fn upsert(&self, record: &OtpRecord) -> Result<(), AgriError> {
        let filter = doc!{ USER_ID: &record.user_id };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection().replace_one(filter, OtpDB::from(record), options)
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

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AgriError> {
        let filter = doc!{ EXPIRES_AT: { "$lte": bson::DateTime::from_chrono(now) } };

        let result = self.collection().delete_many(filter, None)
            .await
            .map_err(AgriError::from)?;

        Ok(result.deleted_count)
    }
}
