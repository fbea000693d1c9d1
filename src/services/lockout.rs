use chrono::{DateTime, Utc};
use crate::{model::{reset::{ResetError, Rejection}, user::User}, utils::context::ServiceContext};

///
/// The account behind the email, provided it can use the local password-reset flow.
///
pub async fn local_user(ctx: &ServiceContext, email: &str) -> Result<User, ResetError> {
    let user = ctx.users().find_by_email(email).await?.ok_or(Rejection::NotFound)?;
    ensure_local(&user)?;
    Ok(user)
}

pub fn ensure_local(user: &User) -> Result<(), ResetError> {
    match user.is_federated() {
        true  => Err(Rejection::UnsupportedAuthMethod.into()),
        false => Ok(()),
    }
}

///
/// Reject the request outright while the user is serving a block. Attempt counts are left alone.
///
pub async fn ensure_not_blocked(ctx: &ServiceContext, user: &User, now: DateTime<Utc>) -> Result<(), ResetError> {
    let entry = ctx.ledger().get(&user.user_id, now).await?;

    match entry.and_then(|entry| entry.blocked_for(now)) {
        Some(retry_after) => {
            tracing::info!("Reset request for blocked user {} rejected, {}s remaining", user.user_id, retry_after.num_seconds());
            Err(Rejection::TooManyAttempts { retry_after }.into())
        },
        None => Ok(()),
    }
}
