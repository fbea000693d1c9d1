use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::utils::errors::{AgriError, ErrorCode};

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 100;
pub const PHONE_LENGTH: usize = 10;
pub const MESSAGE_MIN_LENGTH: usize = 10;
pub const MESSAGE_MAX_LENGTH: usize = 1000;

pub const STATUS_NEW: &str = "new";

///
/// A stored contact-form submission.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Contact {
    pub contact_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

///
/// The cleaned-up form fields, once they have passed validation.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactForm {
    ///
    /// Trim the text fields, strip formatting from the phone number and check the lengths.
    ///
    pub fn parse(name: &str, email: &str, phone: &str, message: &str) -> Result<ContactForm, AgriError> {
        let name = name.trim();
        let name_len = name.chars().count();

        if name_len < NAME_MIN_LENGTH {
            return Err(ErrorCode::InvalidContact.with_msg(&format!("Name must be at least {} characters", NAME_MIN_LENGTH)))
        }

        if name_len > NAME_MAX_LENGTH {
            return Err(ErrorCode::InvalidContact.with_msg(&format!("Name must not exceed {} characters", NAME_MAX_LENGTH)))
        }

        let email = crate::model::user::normalise_email(email);
        if !crate::model::user::looks_like_email(&email) {
            return Err(ErrorCode::InvalidContact.with_msg("Please enter a valid email address"))
        }

        let phone: String = phone.chars().filter(char::is_ascii_digit).collect();
        if phone.len() != PHONE_LENGTH {
            return Err(ErrorCode::InvalidContact.with_msg(&format!("Phone number must be exactly {} digits", PHONE_LENGTH)))
        }

        let message = message.trim();
        let message_len = message.chars().count();

        if message_len < MESSAGE_MIN_LENGTH {
            return Err(ErrorCode::InvalidContact.with_msg(&format!("Message must be at least {} characters", MESSAGE_MIN_LENGTH)))
        }

        if message_len > MESSAGE_MAX_LENGTH {
            return Err(ErrorCode::InvalidContact.with_msg(&format!("Message must not exceed {} characters", MESSAGE_MAX_LENGTH)))
        }

        Ok(ContactForm {
            name: name.to_string(),
            email,
            phone,
            message: message.to_string(),
        })
    }
}
