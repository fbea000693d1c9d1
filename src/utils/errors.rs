use bcrypt::BcryptError;
use mongodb::bson;
use tokio::task::JoinError;
use tonic::{Code, Status};

#[cfg(feature = "kafka")]
use rdkafka::{error::KafkaError, message::OwnedMessage};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorCode {
    TonicStartError                 = 0400,
    HashThreadingIssue              = 0401,
    InvalidConfiguration            = 0402,
    IOError                         = 0403,
    UnableToReadCredentials         = 0500,
    MongoDBError                    = 0503,
    InvalidBSON                     = 0504,
    InvalidJSON                     = 0505,
    KafkaSendError                  = 0506,
    InvalidAlgorthimConfig          = 0508,
    HashingError                    = 0509,
    InvalidPHCFormat                = 0510,
    TokenSigningError               = 0511,
    IdentityProviderError           = 0512,
    EmailAlreadyRegistered          = 1000,
    InvalidCredentials              = 1001,
    UnsupportedAuthMethod           = 1002,
    UserNotFound                    = 1003,
    NameMandatory                   = 1004,
    InvalidEmail                    = 1005,
    PasswordTooShort                = 1006,
    InvalidIdentityToken            = 1007,
    EmailNotVerified                = 1008,
    AccountExistsWithPassword       = 1009,
    TooManyAttempts                 = 2000,
    InvalidOrExpiredOtp             = 2001,
    InvalidOtp                      = 2002,
    MaxAttemptsReached              = 2003,
    VerificationRequired            = 2004,
    InvalidContact                  = 3000,
    ContactRateLimited              = 3001,
}

impl ErrorCode {
    pub fn with_msg(&self, message: &str) -> AgriError {
        AgriError::new(*self, message)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgriError {
    error_code: ErrorCode,
    message: String,
}

impl AgriError {
    pub fn new(error_code: ErrorCode, message: &str) -> Self {
        AgriError { error_code, message: message.to_string() }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AgriError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.message, self.error_code)
    }
}

impl std::error::Error for AgriError {}

impl From<tonic::transport::Error> for AgriError {
    fn from(error: tonic::transport::Error) -> Self {
        ErrorCode::TonicStartError.with_msg(&format!("Failed to start gRPC server: {}", error))
    }
}

impl From<config::ConfigError> for AgriError {
    fn from(error: config::ConfigError) -> Self {
        ErrorCode::InvalidConfiguration.with_msg(&format!("The service configuration is not correct: {}", error))
    }
}

impl From<argon2::Error> for AgriError {
    fn from(error: argon2::Error) -> Self {
        ErrorCode::InvalidAlgorthimConfig.with_msg(&format!("Invalid configuration for algorithm: {}", error))
    }
}

impl From<password_hash::Error> for AgriError {
    fn from(error: password_hash::Error) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash secret: {}", error))
    }
}

impl From<serde_json::Error> for AgriError {
    fn from(error: serde_json::Error) -> Self {
        ErrorCode::InvalidJSON.with_msg(&format!("Unable to convert to json: {}", error))
    }
}

impl From<mongodb::error::Error> for AgriError {
    fn from(error: mongodb::error::Error) -> Self {
        ErrorCode::MongoDBError.with_msg(&format!("MongoDB error: {}", error))
    }
}

impl From<bson::ser::Error> for AgriError {
    fn from(error: bson::ser::Error) -> Self {
        ErrorCode::InvalidBSON.with_msg(&format!("Unable to serialise BSON: {}", error))
    }
}

impl From<bson::de::Error> for AgriError {
    fn from(error: bson::de::Error) -> Self {
        ErrorCode::InvalidBSON.with_msg(&format!("Unable to deserialise BSON: {}", error))
    }
}

impl From<JoinError> for AgriError {
    fn from(error: JoinError) -> Self {
        ErrorCode::HashThreadingIssue.with_msg(&format!("Unable to hash: {}", error))
    }
}

impl From<BcryptError> for AgriError {
    fn from(error: BcryptError) -> Self {
        ErrorCode::InvalidAlgorthimConfig.with_msg(&format!("Unable to verify: {}", error))
    }
}

impl From<jsonwebtoken::errors::Error> for AgriError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        ErrorCode::TokenSigningError.with_msg(&format!("Unable to sign token: {}", error))
    }
}

impl From<reqwest::Error> for AgriError {
    fn from(error: reqwest::Error) -> Self {
        ErrorCode::IdentityProviderError.with_msg(&format!("Unable to contact identity provider: {}", error))
    }
}

#[cfg(feature = "kafka")]
impl From<(KafkaError, OwnedMessage)> for AgriError {
    fn from((error, message): (KafkaError, OwnedMessage)) -> Self {
        ErrorCode::KafkaSendError.with_msg(&format!("Kafka error: {}, message: {:?}", error, message))
    }
}

///
/// Convert our internal error into a gRPC status response.
///
impl From<AgriError> for Status {
    fn from(error: AgriError) -> Self {
        use ErrorCode::*;

        let code = match &error.error_code {
            HashThreadingIssue      |
            HashingError            |
            IdentityProviderError   |
            InvalidAlgorthimConfig  |
            InvalidBSON             |
            InvalidConfiguration    |
            InvalidJSON             |
            InvalidPHCFormat        |
            IOError                 |
            KafkaSendError          |
            MongoDBError            |
            TokenSigningError       |
            TonicStartError         |
            UnableToReadCredentials => Code::Internal,

            UserNotFound => Code::NotFound,

            EmailAlreadyRegistered    |
            AccountExistsWithPassword => Code::AlreadyExists,

            InvalidContact      |
            InvalidEmail        |
            InvalidOrExpiredOtp |
            InvalidOtp          |
            MaxAttemptsReached  |
            NameMandatory       |
            PasswordTooShort    => Code::InvalidArgument,

            EmailNotVerified      |
            UnsupportedAuthMethod |
            VerificationRequired  => Code::FailedPrecondition,

            ContactRateLimited |
            TooManyAttempts    => Code::ResourceExhausted,

            InvalidCredentials   |
            InvalidIdentityToken => Code::Unauthenticated,
        };

        if code == Code::Internal {
            tracing::error!("{}", error);
        }

        Status::with_details(code, error.message, format!("{}", error.error_code as u32).into())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faults_map_to_internal() {
        let status = Status::from(ErrorCode::MongoDBError.with_msg("boom"));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.details(), b"503");
    }

    #[test]
    fn test_blocks_map_to_resource_exhausted() {
        let status = Status::from(ErrorCode::TooManyAttempts.with_msg("Try again after 1 hours"));
        assert_eq!(status.code(), Code::ResourceExhausted);
        assert_eq!(status.message(), "Try again after 1 hours");
        assert_eq!(status.details(), b"2000");
    }
}
