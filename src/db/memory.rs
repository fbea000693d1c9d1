use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use super::{ContactStore, LedgerStore, OtpStore, UserStore};
use crate::model::{contact::Contact, ledger::LedgerEntry, otp::OtpRecord, user::User};
use crate::utils::errors::{ErrorCode, AgriError};

//
// In-process stores for local development and tests. Each mutation happens under a single
// lock acquisition so it is atomic, and nothing is awaited while a lock is held.
//

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>, // Keyed by email.
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AgriError> {
        Ok(self.users.lock().get(email).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AgriError> {
        let mut users = self.users.lock();

        if users.contains_key(&user.email) {
            return Err(ErrorCode::EmailAlreadyRegistered.with_msg("User with this email already exists"))
        }

        users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn update_password(&self, user_id: &str, phc: &str, now: DateTime<Utc>) -> Result<(), AgriError> {
        let mut users = self.users.lock();

        match users.values_mut().find(|user| user.user_id == user_id) {
            Some(user) => {
                user.phc = Some(phc.to_string());
                user.updated_at = now;
                Ok(())
            },
            None => Err(ErrorCode::UserNotFound.with_msg(&format!("User {} no longer exists", user_id))),
        }
    }

    async fn record_login(&self, user_id: &str, profile_image_url: Option<&str>, now: DateTime<Utc>) -> Result<(), AgriError> {
        let mut users = self.users.lock();

        if let Some(user) = users.values_mut().find(|user| user.user_id == user_id) {
            user.updated_at = now;
            user.last_login = Some(now);

            if let Some(url) = profile_image_url {
                user.profile_image_url = Some(url.to_string());
            }
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryOtpStore {
    records: Mutex<HashMap<String, OtpRecord>>, // Keyed by user_id.
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn get(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<OtpRecord>, AgriError> {
        Ok(self.records.lock()
            .get(user_id)
            .filter(|record| record.is_live(now))
            .cloned())
    }

    async fn upsert(&self, record: &OtpRecord) -> Result<(), AgriError> {
        self.records.lock().insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), AgriError> {
        self.records.lock().remove(user_id);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AgriError> {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| record.is_live(now));
        Ok((before - records.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryLedgerStore {
    entries: Mutex<HashMap<String, LedgerEntry>>, // Keyed by user_id.
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<LedgerEntry>, AgriError> {
        Ok(self.entries.lock()
            .get(user_id)
            .filter(|entry| entry.is_live(now))
            .cloned())
    }

    async fn upsert(&self, entry: &LedgerEntry) -> Result<(), AgriError> {
        self.entries.lock().insert(entry.user_id.clone(), entry.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), AgriError> {
        self.entries.lock().remove(user_id);
        Ok(())
    }

    async fn record_failure(&self, user_id: &str, now: DateTime<Utc>, max_attempts: u32, block_for: Duration)
        -> Result<LedgerEntry, AgriError> {

        let mut entries = self.entries.lock();
        let entry = entries.entry(user_id.to_string()).or_insert_with(|| LedgerEntry::new(user_id, now));
        entry.record_failure(now, max_attempts, block_for);
        Ok(entry.clone())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AgriError> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok((before - entries.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryContactStore {
    contacts: Mutex<Vec<Contact>>,
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, contact: &Contact) -> Result<(), AgriError> {
        self.contacts.lock().push(contact.clone());
        Ok(())
    }

    async fn latest_since(&self, email: &str, since: DateTime<Utc>) -> Result<Option<Contact>, AgriError> {
        Ok(self.contacts.lock()
            .iter()
            .filter(|contact| contact.email == email && contact.created_at >= since)
            .max_by_key(|contact| contact.created_at)
            .cloned())
    }
}
