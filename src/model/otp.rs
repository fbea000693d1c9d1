use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

///
/// The single pending reset code for a user. Only the argon2 PHC of the code is kept.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OtpRecord {
    pub user_id: String,
    pub email: String,
    pub otp_phc: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    ///
    /// An expired record is treated as missing, whether or not it has been purged yet.
    ///
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
