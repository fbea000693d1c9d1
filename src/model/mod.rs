pub mod algorithm;
pub mod contact;
pub mod events;
pub mod ledger;
pub mod otp;
pub mod reset;
pub mod user;
