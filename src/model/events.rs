use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

///
/// Asks the mailer to deliver a password-reset code.
///
#[derive(Debug, Deserialize, Serialize)]
pub struct OtpIssued {
    pub email: String,
    pub name: String,
    pub otp: String,
    pub expiry_minutes: i64,
    pub issued_at: DateTime<Utc>,
}

///
/// Asks the mailer to forward a contact-form submission to the admin and thank the sender.
///
#[derive(Debug, Deserialize, Serialize)]
pub struct ContactSubmitted {
    pub contact_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}
