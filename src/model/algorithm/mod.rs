pub mod argon;
pub mod bcrypt;
pub mod pbkdf2;

use std::str::FromStr;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use crate::utils::errors::{ErrorCode, AgriError};

pub use self::argon::ArgonPolicy;

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq)]
pub enum Algorithm {
    Argon,
    BCrypt,
    PBKDF2,
}


///
/// Validate if the plain text secret (password or OTP) matches the hashed PHC provided.
///
/// The algorithm is constructed and used from the PHC string provided, so accounts imported
/// with bcrypt or pbkdf2 hashes still verify.
///
pub fn validate(plain_text: &str, phc: &str) -> Result<bool, AgriError> {
    match select(phc)? {
        Algorithm::Argon  => argon::validate(phc, plain_text),
        Algorithm::BCrypt => bcrypt::validate(phc, plain_text),
        Algorithm::PBKDF2 => pbkdf2::validate(phc, plain_text),
    }
}

///
/// Hashing is CPU-bound so it is performed on the blocking worker thread pool.
///
pub async fn hash_blocking(policy: &ArgonPolicy, plain_text: &str) -> Result<String, AgriError> {
    let policy = policy.clone();
    let plain_text = plain_text.to_string();

    tokio::task::spawn_blocking(move || policy.hash_into_phc(&plain_text))
        .await
        .map_err(AgriError::from)?
}

///
/// As validate, on the blocking worker thread pool.
///
pub async fn validate_blocking(plain_text: &str, phc: &str) -> Result<bool, AgriError> {
    let plain_text = plain_text.to_string();
    let phc = phc.to_string();

    tokio::task::spawn_blocking(move || validate(&plain_text, &phc))
        .await
        .map_err(AgriError::from)?
}

///
/// Parse the first part of the phc string and return the algorithm.
///
fn select(phc: &str) -> Result<Algorithm, AgriError> {
    let mut split = phc.split('$');
    split.next(); /* Skip first it's blank */

    match split.next() {
        Some(algorithm) => Algorithm::from_str(algorithm),
        None => Err(ErrorCode::InvalidPHCFormat.with_msg("The PHC is invalid, there's no algorithm")),
    }
}

impl FromStr for Algorithm {
    type Err = AgriError;

    fn from_str(input: &str) -> Result<Algorithm, Self::Err> {
        match input {
            "argon2i"  |
            "argon2d"  |
            "argon2id" => Ok(Algorithm::Argon),

            "2a" |
            "2b" |
            "2x" |
            "2y" => Ok(Algorithm::BCrypt),

            "pbkdf2-sha256" => Ok(Algorithm::PBKDF2),

            _ => Err(ErrorCode::InvalidPHCFormat.with_msg(&format!("algorithm {} is un-handled", input))),
        }
    }
}
