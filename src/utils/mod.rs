use uuid::Uuid;

pub mod config;
pub mod context;
pub mod errors;
pub mod health;
pub mod identity;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod notifier;
pub mod otp;
pub mod reaper;
pub mod time_provider;
pub mod token;


pub fn generate_id() -> String {
    Uuid::new_v4().to_hyphenated().to_string()
}
