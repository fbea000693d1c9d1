use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use jsonwebtoken::{encode, EncodingKey, Header};
use super::{config::Configuration, errors::AgriError};

///
/// Session token claims. Tokens are HS256 signed and carry only the user id.
///
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Claims {
    pub id: String,
    pub exp: i64,
}

pub fn issue_token(config: &Configuration, user_id: &str, now: DateTime<Utc>) -> Result<String, AgriError> {
    let claims = Claims {
        id: user_id.to_string(),
        exp: (now + Duration::days(config.token_ttl_days)).timestamp(),
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(config.jwt_secret.as_bytes()))?)
}
