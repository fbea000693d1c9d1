use std::fmt;
use chrono::Duration;
use tonic::Status;
use crate::utils::errors::{AgriError, ErrorCode};

///
/// Why the password-reset state machine turned a request away. These are all the caller's
/// problem - none of them indicate a fault in the service.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    NotFound,
    UnsupportedAuthMethod,
    TooManyAttempts { retry_after: Duration },
    InvalidOrExpired,
    InvalidOtp { attempts_remaining: u32 },
    MaxAttemptsReached { max_attempts: u32, blocked_for: Duration },
    VerificationRequired,
    PasswordTooShort { min_length: usize },
}

impl Rejection {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Rejection::NotFound                   => ErrorCode::UserNotFound,
            Rejection::UnsupportedAuthMethod      => ErrorCode::UnsupportedAuthMethod,
            Rejection::TooManyAttempts { .. }     => ErrorCode::TooManyAttempts,
            Rejection::InvalidOrExpired           => ErrorCode::InvalidOrExpiredOtp,
            Rejection::InvalidOtp { .. }          => ErrorCode::InvalidOtp,
            Rejection::MaxAttemptsReached { .. }  => ErrorCode::MaxAttemptsReached,
            Rejection::VerificationRequired       => ErrorCode::VerificationRequired,
            Rejection::PasswordTooShort { .. }    => ErrorCode::PasswordTooShort,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotFound => write!(f, "User not found"),
            Rejection::UnsupportedAuthMethod => write!(f, "This account uses Google Sign-In. Password reset is not available."),
            Rejection::TooManyAttempts { retry_after } => write!(f, "Too many attempts. Try again after {}", whole_units(*retry_after)),
            Rejection::InvalidOrExpired => write!(f, "OTP expired or invalid"),
            Rejection::InvalidOtp { attempts_remaining } => write!(f, "Invalid OTP. You have {} attempt(s) remaining", attempts_remaining),
            Rejection::MaxAttemptsReached { max_attempts, blocked_for } =>
                write!(f, "Maximum attempts ({}) reached. Account blocked for {}", max_attempts, whole_units(*blocked_for)),
            Rejection::VerificationRequired => write!(f, "Please verify OTP first"),
            Rejection::PasswordTooShort { min_length } => write!(f, "Password must be at least {} characters", min_length),
        }
    }
}

///
/// Wait times are shown rounded down - whole hours when there is at least one, otherwise minutes.
///
fn whole_units(duration: Duration) -> String {
    let minutes = duration.num_seconds().max(0) / 60;
    let hours = minutes / 60;

    match hours {
        0 => format!("{} minutes", minutes),
        _ => format!("{} hours", hours),
    }
}

///
/// The outcome of a failed reset operation: either a rejection the caller can act on, or a
/// fault talking to a store.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ResetError {
    Rejected(Rejection),
    Fault(AgriError),
}

impl ResetError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ResetError::Rejected(rejection) => Some(rejection),
            ResetError::Fault(_) => None,
        }
    }
}

impl From<Rejection> for ResetError {
    fn from(rejection: Rejection) -> Self {
        ResetError::Rejected(rejection)
    }
}

impl From<AgriError> for ResetError {
    fn from(error: AgriError) -> Self {
        ResetError::Fault(error)
    }
}

impl From<ResetError> for AgriError {
    fn from(error: ResetError) -> Self {
        match error {
            ResetError::Rejected(rejection) => rejection.error_code().with_msg(&rejection.to_string()),
            ResetError::Fault(fault) => fault,
        }
    }
}

impl From<ResetError> for Status {
    fn from(error: ResetError) -> Self {
        Status::from(AgriError::from(error))
    }
}
