use std::future::Future;
use std::time::Duration;
use async_trait::async_trait;
use crate::model::contact::Contact;

///
/// Delivers messages to users out-of-band. Delivery is best-effort: a false return or a hang
/// never changes the outcome of the operation that asked for it.
///
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_otp(&self, email: &str, name: &str, otp: &str, expiry_minutes: i64) -> bool;

    ///
    /// Forward a contact-form submission to the admin and thank the sender.
    ///
    async fn send_contact(&self, contact: &Contact) -> bool;
}

///
/// Development notifier - records the delivery in the log instead of sending anything.
///
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_otp(&self, email: &str, name: &str, _otp: &str, expiry_minutes: i64) -> bool {
        // The code itself is never logged.
        tracing::info!("Password reset OTP sent to {} ({}) valid for {} minutes", email, name, expiry_minutes);
        true
    }

    async fn send_contact(&self, contact: &Contact) -> bool {
        tracing::info!("Contact form {} received from {} <{}>", contact.contact_id, contact.name, contact.email);
        true
    }
}

///
/// Wait at most timeout for a delivery, logging rather than surfacing any failure.
///
pub async fn bounded<F>(timeout: Duration, what: &str, delivery: F) -> bool
where
    F: Future<Output = bool>,
{
    match tokio::time::timeout(timeout, delivery).await {
        Ok(true) => true,
        Ok(false) => {
            tracing::warn!("{} could not be delivered", what);
            false
        },
        Err(_) => {
            tracing::warn!("{} was not delivered within {}ms", what, timeout.as_millis());
            false
        },
    }
}
