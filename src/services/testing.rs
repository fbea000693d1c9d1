use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use crate::{db::Stores, model::{algorithm, contact::Contact, user::{FederatedIdentity, User}}, utils::{config::Configuration, context::ServiceContext, errors::AgriError, generate_id, identity::IdentityVerifier, notifier::Notifier, otp::FixedCodeGenerator}};

//
// Shared fixtures for the service unit tests.
//

#[derive(Default)]
pub struct RecordingNotifier {
    otps: Mutex<Vec<(String, String)>>,
    contacts: Mutex<Vec<String>>,
    expiries: Mutex<Vec<i64>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn otps(&self) -> Vec<(String, String)> {
        self.otps.lock().clone()
    }

    pub fn expiry_minutes(&self) -> Vec<i64> {
        self.expiries.lock().clone()
    }

    pub fn contacts(&self) -> Vec<String> {
        self.contacts.lock().clone()
    }

    pub fn fail_deliveries(&self) {
        *self.failing.lock() = true;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_otp(&self, email: &str, _name: &str, otp: &str, expiry_minutes: i64) -> bool {
        if *self.failing.lock() {
            return false
        }
        self.otps.lock().push((email.to_string(), otp.to_string()));
        self.expiries.lock().push(expiry_minutes);
        true
    }

    async fn send_contact(&self, contact: &Contact) -> bool {
        if *self.failing.lock() {
            return false
        }
        self.contacts.lock().push(contact.email.clone());
        true
    }
}

pub struct StubIdentity(pub Option<FederatedIdentity>);

#[async_trait]
impl IdentityVerifier for StubIdentity {
    async fn verify(&self, _id_token: &str) -> Result<Option<FederatedIdentity>, AgriError> {
        Ok(self.0.clone())
    }
}

pub fn noon() -> DateTime<Utc> {
    Utc.ymd(2024, 3, 1).and_hms(12, 0, 0)
}

pub fn config() -> Configuration {
    let mut config = Configuration::default();
    config.store_backend = "memory".to_string();
    config.argon_memory_kb = 256;
    config
}

///
/// An in-memory context with its clock fixed at noon, handing out the codes given in order.
///
pub fn context(codes: &[&str]) -> (Arc<ServiceContext>, Arc<RecordingNotifier>) {
    context_with_identity(codes, None)
}

pub fn context_with_identity(codes: &[&str], identity: Option<FederatedIdentity>) -> (Arc<ServiceContext>, Arc<RecordingNotifier>) {
    context_with_config(config(), codes, identity)
}

pub fn context_with_config(config: Configuration, codes: &[&str], identity: Option<FederatedIdentity>) -> (Arc<ServiceContext>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());

    let ctx = ServiceContext::new(config, Stores::memory())
        .expect("test context")
        .with_notifier(notifier.clone())
        .with_generator(Arc::new(FixedCodeGenerator::new(codes)))
        .with_identity_verifier(Arc::new(StubIdentity(identity)));

    ctx.set_now(Some(noon()));
    (Arc::new(ctx), notifier)
}

pub async fn local_user(ctx: &ServiceContext, email: &str, password: &str) -> User {
    let phc = algorithm::hash_blocking(ctx.argon_policy(), password).await.expect("hash");
    let user = User::new_local(generate_id(), "Asha", email, phc, ctx.now());
    ctx.users().create(&user).await.expect("create user");
    user
}

pub fn identity(email: &str) -> FederatedIdentity {
    FederatedIdentity {
        subject: "google-1234".to_string(),
        email: email.to_string(),
        email_verified: true,
        name: Some("Ravi".to_string()),
        picture: Some("https://example.com/ravi.png".to_string()),
    }
}

pub async fn federated_user(ctx: &ServiceContext, email: &str) -> User {
    let user = User::new_federated(generate_id(), &identity(email), ctx.now());
    ctx.users().create(&user).await.expect("create user");
    user
}
