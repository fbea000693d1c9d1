use crate::utils::errors::AgriError;

///
/// Verify against a bcrypt hash ($2b$...) - accounts migrated from the previous backend carry these.
///
pub fn validate(phc: &str, plain_text: &str) -> Result<bool, AgriError> {
    bcrypt::verify(plain_text, phc).map_err(AgriError::from)
}
