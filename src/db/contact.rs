use mongodb::{Database, options::FindOneOptions};
use bson::doc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{ContactStore, prelude::*};
use crate::{model::contact::Contact, utils::errors::AgriError};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ContactDB {
    pub contact_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub status: String,
    pub created_at: bson::DateTime,
}

impl From<&Contact> for ContactDB {
    fn from(contact: &Contact) -> Self {
        ContactDB {
            contact_id: contact.contact_id.clone(),
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            message: contact.message.clone(),
            status: contact.status.clone(),
            created_at: bson::DateTime::from_chrono(contact.created_at),
        }
    }
}

impl From<ContactDB> for Contact {
    fn from(contact: ContactDB) -> Self {
        Contact {
            contact_id: contact.contact_id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            message: contact.message,
            status: contact.status,
            created_at: contact.created_at.to_chrono(),
        }
    }
}

pub struct MongoContactStore {
    db: Database,
}

impl MongoContactStore {
    pub fn new(db: Database) -> Self {
        MongoContactStore { db }
    }

    fn collection(&self) -> mongodb::Collection<ContactDB> {
        self.db.collection::<ContactDB>(CONTACTS)
    }
}

#[async_trait]
impl ContactStore for MongoContactStore {

    async fn insert(&self, contact: &Contact) -> Result<(), AgriError> {
        self.collection().insert_one(ContactDB::from(contact), None)
            .await
            .map_err(AgriError::from)?;

        Ok(())
    }

    async fn latest_since(&self, email: &str, since: DateTime<Utc>) -> Result<Option<Contact>, AgriError> {
        let filter = doc!{
            EMAIL: email,
            CREATED_AT: { "$gte": bson::DateTime::from_chrono(since) }
        };
        let options = FindOneOptions::builder().sort(doc!{ CREATED_AT: -1 }).build();

        Ok(self.collection().find_one(filter, options)
            .await
            .map_err(AgriError::from)?
            .map(Contact::from))
    }
}
