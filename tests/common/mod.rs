#![allow(dead_code)]

use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::Mutex;
use tonic::{Request, Status};
use agrinova::db::Stores;
use agrinova::grpc::{admin, api, common};
use agrinova::grpc::admin::admin_server::Admin;
use agrinova::grpc::api::accounts_server::Accounts;
use agrinova::model::{contact::Contact, user::FederatedIdentity};
use agrinova::utils::{config::Configuration, context::ServiceContext, errors::AgriError, identity::IdentityVerifier, notifier::Notifier, otp::FixedCodeGenerator};

pub const START_TIME: &str = "2024-03-01T12:00:00Z";

///
/// A service instance running in-process on the memory stores, with its clock fixed at START_TIME.
///
/// Tests talk to it through the same gRPC trait implementations the server exposes.
///
pub struct TestContext {
    pub service: Arc<ServiceContext>,
    pub mailbox: Arc<Mailbox>,
}

///
/// Captures everything the service tries to deliver.
///
#[derive(Default)]
pub struct Mailbox {
    otps: Mutex<Vec<(String, String)>>,
    contacts: Mutex<Vec<Contact>>,
}

impl Mailbox {
    pub fn last_otp(&self, email: &str) -> Option<String> {
        self.otps.lock().iter().rev().find(|(to, _)| to == email).map(|(_, otp)| otp.clone())
    }

    pub fn otp_count(&self) -> usize {
        self.otps.lock().len()
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.contacts.lock().clone()
    }
}

#[async_trait]
impl Notifier for Mailbox {
    async fn send_otp(&self, email: &str, _name: &str, otp: &str, _expiry_minutes: i64) -> bool {
        self.otps.lock().push((email.to_string(), otp.to_string()));
        true
    }

    async fn send_contact(&self, contact: &Contact) -> bool {
        self.contacts.lock().push(contact.clone());
        true
    }
}

///
/// Accepts the token "valid-token" as the identity given, and nothing else.
///
pub struct FakeGoogle(pub FederatedIdentity);

#[async_trait]
impl IdentityVerifier for FakeGoogle {
    async fn verify(&self, id_token: &str) -> Result<Option<FederatedIdentity>, AgriError> {
        match id_token {
            "valid-token" => Ok(Some(self.0.clone())),
            _ => Ok(None),
        }
    }
}

pub fn google_identity(email: &str, email_verified: bool) -> FederatedIdentity {
    FederatedIdentity {
        subject: "109876543210".to_string(),
        email: email.to_string(),
        email_verified,
        name: Some("Ravi Kumar".to_string()),
        picture: Some("https://example.com/ravi.png".to_string()),
    }
}

pub async fn start(codes: &[&str]) -> TestContext {
    start_with_google(codes, google_identity("ravi@example.com", true)).await
}

pub async fn start_with_google(codes: &[&str], identity: FederatedIdentity) -> TestContext {
    let mut config = Configuration::default();
    config.store_backend = "memory".to_string();
    config.argon_memory_kb = 256;
    config.admin_enabled = true;
    config.validate().expect("valid test config");

    let mailbox = Arc::new(Mailbox::default());

    let service = ServiceContext::new(config, Stores::memory())
        .expect("Unable to create the service context")
        .with_notifier(mailbox.clone())
        .with_generator(Arc::new(FixedCodeGenerator::new(codes)))
        .with_identity_verifier(Arc::new(FakeGoogle(identity)));

    let ctx = TestContext { service: Arc::new(service), mailbox };
    ctx.set_time(START_TIME).await;
    ctx
}

impl TestContext {
    pub async fn set_time(&self, rfc3339: &str) {
        self.service.set_time(Request::new(admin::NewTime { new_time: rfc3339.to_string() }))
            .await
            .expect("set_time failed");
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<api::AuthResponse, Status> {
        self.service.register(Request::new(api::RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })).await.map(|response| response.into_inner())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<api::AuthResponse, Status> {
        self.service.login(Request::new(api::LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })).await.map(|response| response.into_inner())
    }

    pub async fn google_sign_in(&self, id_token: &str) -> Result<api::AuthResponse, Status> {
        self.service.google_sign_in(Request::new(api::GoogleSignInRequest { id_token: id_token.to_string() }))
            .await
            .map(|response| response.into_inner())
    }

    pub async fn request_reset(&self, email: &str) -> Result<api::RequestResetResponse, Status> {
        self.service.request_reset(Request::new(api::RequestResetRequest { email: email.to_string() }))
            .await
            .map(|response| response.into_inner())
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<common::MessageResponse, Status> {
        self.service.verify_otp(Request::new(api::VerifyOtpRequest { email: email.to_string(), otp: otp.to_string() }))
            .await
            .map(|response| response.into_inner())
    }

    pub async fn complete_reset(&self, email: &str, new_password: &str) -> Result<common::MessageResponse, Status> {
        self.service.complete_reset(Request::new(api::CompleteResetRequest {
            email: email.to_string(),
            new_password: new_password.to_string(),
        })).await.map(|response| response.into_inner())
    }

    pub async fn submit_contact(&self, name: &str, email: &str, phone: &str, message: &str) -> Result<common::MessageResponse, Status> {
        self.service.submit_contact(Request::new(api::ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            message: message.to_string(),
        })).await.map(|response| response.into_inner())
    }
}

///
/// The service's numeric error code, carried in the status details.
///
pub fn error_code(status: Status) -> u32 {
    std::str::from_utf8(status.details())
        .expect("Error code was not UTF-8")
        .parse()
        .expect("Error code was not numeric")
}
