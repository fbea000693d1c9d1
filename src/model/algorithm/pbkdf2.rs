use pbkdf2::Pbkdf2;
use pbkdf2::password_hash::{PasswordHash, PasswordVerifier};
use crate::utils::errors::AgriError;

///
/// Verify against a pbkdf2-sha256 PHC. Only ever used for imported accounts.
///
pub fn validate(phc: &str, plain_text: &str) -> Result<bool, AgriError> {
    let parsed_hash = PasswordHash::new(phc)?;
    Ok(Pbkdf2.verify_password(plain_text.as_bytes(), &parsed_hash).is_ok())
}
