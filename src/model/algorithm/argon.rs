use rand_core::OsRng;
use argon2::{Argon2, Params, Version};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use crate::utils::{config::Configuration, errors::AgriError};

///
/// Argon2id cost parameters used for every new password and OTP hash.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ArgonPolicy {
    pub memory_size_kb: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl ArgonPolicy {
    pub fn from_config(config: &Configuration) -> Self {
        ArgonPolicy {
            memory_size_kb: config.argon_memory_kb,
            iterations: config.argon_iterations,
            parallelism: config.argon_parallelism,
        }
    }

    pub fn hash_into_phc(&self, plain_text: &str) -> Result<String, AgriError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_size_kb, self.iterations, self.parallelism, None)?;
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        // Hash to PHC string ($argon2id$v=19$...)
        Ok(argon2.hash_password(plain_text.as_bytes(), &salt)?.to_string())
    }
}

impl Default for ArgonPolicy {
    fn default() -> Self {
        ArgonPolicy {
            memory_size_kb: 1024 * 16,
            iterations: 1,
            parallelism: 1,
        }
    }
}

///
/// The cost parameters are read back out of the PHC, so old hashes keep verifying after a
/// policy change.
///
pub fn validate(phc: &str, plain_text: &str) -> Result<bool, AgriError> {
    let parsed_hash = PasswordHash::new(phc)?;
    Ok(Argon2::default().verify_password(plain_text.as_bytes(), &parsed_hash).is_ok())
}
