use mongodb::Database;
use bson::doc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{UserStore, mongo, prelude::*};
use crate::{model::user::{AuthProvider, User}, utils::errors::{ErrorCode, AgriError}};

///
/// The persisted shape of a user - timestamps are BSON dates, which are always UTC.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserDB {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phc: Option<String>,
    pub auth_provider: AuthProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,         // Omitted rather than null so the sparse unique index ignores it.
    pub profile_image_url: Option<String>,
    pub role: String,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
    pub last_login: Option<bson::DateTime>,
}

impl From<&User> for UserDB {
    fn from(user: &User) -> Self {
        UserDB {
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phc: user.phc.clone(),
            auth_provider: user.auth_provider,
            google_id: user.google_id.clone(),
            profile_image_url: user.profile_image_url.clone(),
            role: user.role.clone(),
            created_at: bson::DateTime::from_chrono(user.created_at),
            updated_at: bson::DateTime::from_chrono(user.updated_at),
            last_login: user.last_login.map(bson::DateTime::from_chrono),
        }
    }
}

impl From<UserDB> for User {
    fn from(user: UserDB) -> Self {
        User {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            phc: user.phc,
            auth_provider: user.auth_provider,
            google_id: user.google_id,
            profile_image_url: user.profile_image_url,
            role: user.role,
            created_at: user.created_at.to_chrono(),
            updated_at: user.updated_at.to_chrono(),
            last_login: user.last_login.map(|dt| dt.to_chrono()),
        }
    }
}

pub struct MongoUserStore {
    db: Database,
}

impl MongoUserStore {
    pub fn new(db: Database) -> Self {
        MongoUserStore { db }
    }

    fn collection(&self) -> mongodb::Collection<UserDB> {
        self.db.collection::<UserDB>(USERS)
    }
}

#[async_trait]
impl UserStore for MongoUserStore {

    ///
    /// Load the requested user from the database.
    ///
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AgriError> {
        let filter = doc!{ EMAIL: email };

        Ok(self.collection().find_one(filter, None)
            .await
            .map_err(AgriError::from)?
            .map(User::from))
    }

    async fn create(&self, user: &User) -> Result<(), AgriError> {
        match self.collection().insert_one(UserDB::from(user), None).await {
            Ok(_) => Ok(()),
            Err(err) => match mongo::is_duplicate_err(&err) {
                true  => Err(ErrorCode::EmailAlreadyRegistered.with_msg("User with this email already exists")),
                false => Err(AgriError::from(err)),
            },
        }
    }

    ///
    /// Replace the password hash and stamp the change.
    ///
    async fn update_password(&self, user_id: &str, phc: &str, now: DateTime<Utc>) -> Result<(), AgriError> {
        let filter = doc!{ USER_ID: user_id };
        let update = doc!{
            "$set": {
                PHC: phc,
                UPDATED_AT: bson::DateTime::from_chrono(now),
            }
        };

        let result = self.collection().update_one(filter, update, None)
            .await
            .map_err(AgriError::from)?;

        match result.matched_count {
            0 => Err(ErrorCode::UserNotFound.with_msg(&format!("User {} no longer exists", user_id))),
            _ => Ok(()),
        }
    }

    async fn record_login(&self, user_id: &str, profile_image_url: Option<&str>, now: DateTime<Utc>) -> Result<(), AgriError> {
        let filter = doc!{ USER_ID: user_id };
        let now = bson::DateTime::from_chrono(now);

        let update = match profile_image_url {
            Some(url) => doc!{ "$set": { UPDATED_AT: now, LAST_LOGIN: now, PROFILE_IMAGE_URL: url } },
            None      => doc!{ "$set": { UPDATED_AT: now, LAST_LOGIN: now } },
        };

        self.collection().update_one(filter, update, None)
            .await
            .map_err(AgriError::from)?;

        Ok(())
    }
}
