pub mod contact;
pub mod ledger;
pub mod memory;
pub mod mongo;
pub mod otp;
pub mod user;

use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mongodb::Database;
use crate::model::{contact::Contact, ledger::LedgerEntry, otp::OtpRecord, user::User};
use crate::utils::errors::AgriError;

pub mod prelude {
    // Collection names.
    pub const USERS:    &str = "Users";
    pub const OTPS:     &str = "ResetOtps";
    pub const LEDGER:   &str = "ResetLedger";
    pub const CONTACTS: &str = "Contacts";

    // Field names.
    pub const ATTEMPTS:          &str = "attempts";
    pub const BLOCKED_UNTIL:     &str = "blocked_until";
    pub const CREATED_AT:        &str = "created_at";
    pub const EMAIL:             &str = "email";
    pub const EXPIRES_AT:        &str = "expires_at";
    pub const GOOGLE_ID:         &str = "google_id";
    pub const LAST_LOGIN:        &str = "last_login";
    pub const PHC:               &str = "phc";
    pub const PROFILE_IMAGE_URL: &str = "profile_image_url";
    pub const UPDATED_AT:        &str = "updated_at";
    pub const USER_ID:           &str = "user_id";
}

///
/// Accounts, keyed by email. The reset state machine only reads these, bar the final password write.
///
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AgriError>;

    ///
    /// Fails with EmailAlreadyRegistered if the email is taken.
    ///
    async fn create(&self, user: &User) -> Result<(), AgriError>;

    async fn update_password(&self, user_id: &str, phc: &str, now: DateTime<Utc>) -> Result<(), AgriError>;

    async fn record_login(&self, user_id: &str, profile_image_url: Option<&str>, now: DateTime<Utc>) -> Result<(), AgriError>;
}

///
/// At most one pending reset code per user. An expired record is never returned by get.
///
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn get(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<OtpRecord>, AgriError>;

    ///
    /// Replace any record for the same user, or create one.
    ///
    async fn upsert(&self, record: &OtpRecord) -> Result<(), AgriError>;

    async fn delete(&self, user_id: &str) -> Result<(), AgriError>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AgriError>;
}

///
/// At most one attempt/block entry per user. An entry whose block has lapsed is never returned by get.
///
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<LedgerEntry>, AgriError>;

    async fn upsert(&self, entry: &LedgerEntry) -> Result<(), AgriError>;

    async fn delete(&self, user_id: &str) -> Result<(), AgriError>;

    ///
    /// Atomically count one more failed attempt for the user and, if that reaches max_attempts,
    /// block them for block_for. Returns the entry as it was written.
    ///
    async fn record_failure(&self, user_id: &str, now: DateTime<Utc>, max_attempts: u32, block_for: Duration)
        -> Result<LedgerEntry, AgriError>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AgriError>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, contact: &Contact) -> Result<(), AgriError>;

    ///
    /// The most recent submission from the email at or after since.
    ///
    async fn latest_since(&self, email: &str, since: DateTime<Utc>) -> Result<Option<Contact>, AgriError>;
}

///
/// The stores handed to the service context at start-up.
///
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub otps: Arc<dyn OtpStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub contacts: Arc<dyn ContactStore>,
    db: Option<Database>,
}

impl Stores {
    pub fn mongo(db: Database) -> Self {
        Stores {
            users: Arc::new(user::MongoUserStore::new(db.clone())),
            otps: Arc::new(otp::MongoOtpStore::new(db.clone())),
            ledger: Arc::new(ledger::MongoLedgerStore::new(db.clone())),
            contacts: Arc::new(contact::MongoContactStore::new(db.clone())),
            db: Some(db),
        }
    }

    pub fn memory() -> Self {
        Stores {
            users: Arc::new(memory::MemoryUserStore::default()),
            otps: Arc::new(memory::MemoryOtpStore::default()),
            ledger: Arc::new(memory::MemoryLedgerStore::default()),
            contacts: Arc::new(memory::MemoryContactStore::default()),
            db: None,
        }
    }

    ///
    /// Check the backing database is contactable. The in-memory stores always are.
    ///
    pub async fn ping(&self) -> Result<(), AgriError> {
        match &self.db {
            Some(db) => mongo::ping(db).await.map(|_| ()),
            None => Ok(()),
        }
    }
}
