use derive_more::Display;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "user";

///
/// Who verifies the user's credentials.
///
#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[display(fmt = "local")]
    Local,
    #[display(fmt = "google")]
    Google,
}

///
/// An account. The email is the identity key, user_id is what the reset stores are keyed by.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phc: Option<String>,               // Never set for federated accounts.
    pub auth_provider: AuthProvider,
    pub google_id: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new_local(user_id: String, name: &str, email: &str, phc: String, now: DateTime<Utc>) -> Self {
        User {
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            phc: Some(phc),
            auth_provider: AuthProvider::Local,
            google_id: None,
            profile_image_url: None,
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    pub fn new_federated(user_id: String, identity: &FederatedIdentity, now: DateTime<Utc>) -> Self {
        User {
            user_id,
            name: identity.display_name(),
            email: identity.email.clone(),
            phc: None,
            auth_provider: AuthProvider::Google,
            google_id: Some(identity.subject.clone()),
            profile_image_url: identity.picture.clone(),
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
            last_login: Some(now),
        }
    }

    ///
    /// Federated accounts have no usable password and can't use any local-credential flow.
    ///
    pub fn is_federated(&self) -> bool {
        self.auth_provider != AuthProvider::Local
    }
}

///
/// The verified claims of an external identity provider's token.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FederatedIdentity {
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl FederatedIdentity {
    ///
    /// The provider's name for the user, or the local-part of their email if they have none.
    ///
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.email.split('@').next().unwrap_or_default().to_string(),
        }
    }
}

///
/// Emails are compared trimmed and lower-cased everywhere.
///
pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

///
/// A deliberately loose shape check - delivery of the OTP is the real proof of ownership.
///
pub fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}
