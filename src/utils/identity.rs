use async_trait::async_trait;
use serde::Deserialize;
use crate::model::user::FederatedIdentity;
use super::errors::AgriError;

const GOOGLE_TOKEN_INFO: &str = "https://oauth2.googleapis.com/tokeninfo";

///
/// Verifies ID tokens issued by the federated identity provider.
///
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    ///
    /// None if the token is invalid, expired or was issued for another application.
    ///
    async fn verify(&self, id_token: &str) -> Result<Option<FederatedIdentity>, AgriError>;
}

///
/// Validates Google ID tokens with Google's tokeninfo endpoint.
///
pub struct GoogleTokenInfo {
    client: reqwest::Client,
    client_id: Option<String>,
}

// tokeninfo returns every claim as a string.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    exp: Option<String>,
}

impl GoogleTokenInfo {
    pub fn new(client_id: Option<String>) -> Result<Self, AgriError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(GoogleTokenInfo { client, client_id })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenInfo {
    async fn verify(&self, id_token: &str) -> Result<Option<FederatedIdentity>, AgriError> {
        let response = self.client.get(GOOGLE_TOKEN_INFO)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::info!("Google token verification failed: {}", response.status());
            return Ok(None)
        }

        let info: TokenInfo = response.json().await?;
        Ok(accept(info, self.client_id.as_deref(), chrono::Utc::now().timestamp()))
    }
}

fn accept(info: TokenInfo, client_id: Option<&str>, now: i64) -> Option<FederatedIdentity> {
    if let Some(client_id) = client_id {
        if info.aud.as_deref() != Some(client_id) {
            tracing::info!("Google token audience mismatch");
            return None
        }
    }

    if let Some(exp) = info.exp.as_deref().and_then(|exp| exp.parse::<i64>().ok()) {
        if exp < now {
            tracing::info!("Google token expired");
            return None
        }
    }

    Some(FederatedIdentity {
        subject: info.sub?,
        email: crate::model::user::normalise_email(&info.email?),
        email_verified: info.email_verified.as_deref() == Some("true"),
        name: info.name,
        picture: info.picture,
    })
}
