use tonic::{Request, Response, Status};
use crate::{grpc::api, model::{algorithm, otp::OtpRecord, reset::ResetError, user::normalise_email}, utils::context::ServiceContext};
use super::lockout;

pub async fn request_reset(ctx: &ServiceContext, request: Request<api::RequestResetRequest>)
    -> Result<Response<api::RequestResetResponse>, Status> {

    // Get the domain-level gRPC request struct.
    let request = request.into_inner();

    let expires_in_seconds = issue_otp(ctx, &request.email).await?;

    Ok(Response::new(api::RequestResetResponse {
        message: "OTP sent to your email".to_string(),
        expires_in_seconds,
    }))
}

///
/// Issue a fresh OTP for the user, replacing any they already had, and send it to them.
///
/// Returns the number of seconds the code is valid for.
///
pub async fn issue_otp(ctx: &ServiceContext, email: &str) -> Result<i64, ResetError> {
    let email = normalise_email(email);
    let now = ctx.now();

    let user = lockout::local_user(ctx, &email).await?;
    lockout::ensure_not_blocked(ctx, &user, now).await?;

    // Only the hash is kept - the plain code goes to the user and nowhere else.
    let otp = ctx.generator().generate(ctx.config().otp_length);
    let otp_phc = algorithm::hash_blocking(ctx.argon_policy(), &otp).await?;

    let record = OtpRecord {
        user_id: user.user_id.clone(),
        email: email.clone(),
        otp_phc,
        created_at: now,
        expires_at: now + ctx.config().otp_expiry(),
    };

    ctx.otps().upsert(&record).await?;
    tracing::info!("Reset OTP issued for user {}", user.user_id);

    // Delivery is best-effort - the OTP stands whether or not it arrives.
    let expiry_minutes = ctx.config().otp_expiry_minutes();
    ctx.notify("Reset OTP email", ctx.notifier().send_otp(&email, &user.name, &otp, expiry_minutes)).await;

    Ok(ctx.config().otp_expiry_seconds)
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::{model::reset::Rejection, services::testing::*, utils::errors::AgriError};

    #[tokio::test]
    async fn test_otp_is_stored_hashed_and_sent() -> Result<(), AgriError> {
        let (ctx, notifier) = context(&["123456"]);
        let user = local_user(&ctx, "a@x.com", "password1").await;

        assert_eq!(issue_otp(&ctx, " A@X.com ").await?, 300);

        let record = ctx.otps().get(&user.user_id, ctx.now()).await?.unwrap();
        assert_ne!(record.otp_phc, "123456");
        assert!(algorithm::validate("123456", &record.otp_phc)?);
        assert_eq!(record.expires_at - record.created_at, Duration::minutes(5));
        assert_eq!(notifier.otps(), vec![("a@x.com".to_string(), "123456".to_string())]);
        assert_eq!(notifier.expiry_minutes(), vec![5]);
        Ok(())
    }

    #[tokio::test]
    async fn test_part_minutes_are_announced_as_a_whole_minute() -> Result<(), AgriError> {
        let mut short = config();
        short.otp_expiry_seconds = 90;
        let (ctx, notifier) = context_with_config(short, &["123456"], None);
        local_user(&ctx, "a@x.com", "password1").await;

        assert_eq!(issue_otp(&ctx, "a@x.com").await?, 90);
        assert_eq!(notifier.expiry_minutes(), vec![2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_found() {
        let (ctx, notifier) = context(&["123456"]);
        let error = issue_otp(&ctx, "nobody@x.com").await.unwrap_err();
        assert_eq!(error.rejection(), Some(&Rejection::NotFound));
        assert!(notifier.otps().is_empty());
    }

    #[tokio::test]
    async fn test_federated_account_is_unsupported() {
        let (ctx, _notifier) = context(&["123456"]);
        federated_user(&ctx, "g@x.com").await;

        let error = issue_otp(&ctx, "g@x.com").await.unwrap_err();
        assert_eq!(error.rejection(), Some(&Rejection::UnsupportedAuthMethod));
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_the_request() -> Result<(), AgriError> {
        let (ctx, notifier) = context(&["123456"]);
        let user = local_user(&ctx, "a@x.com", "password1").await;
        notifier.fail_deliveries();

        assert_eq!(issue_otp(&ctx, "a@x.com").await?, 300);
        assert!(ctx.otps().get(&user.user_id, ctx.now()).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_blocked_user_gets_no_new_otp() -> Result<(), AgriError> {
        let (ctx, notifier) = context(&["123456"]);
        let user = local_user(&ctx, "a@x.com", "password1").await;

        let now = ctx.now();
        for _ in 0..3 {
            ctx.ledger().record_failure(&user.user_id, now, 3, Duration::hours(1)).await?;
        }

        ctx.set_now(Some(now + Duration::minutes(30)));
        let error = issue_otp(&ctx, "a@x.com").await.unwrap_err();
        assert_eq!(error.rejection(), Some(&Rejection::TooManyAttempts { retry_after: Duration::minutes(30) }));
        assert!(ctx.otps().get(&user.user_id, ctx.now()).await?.is_none());
        assert!(notifier.otps().is_empty());
        Ok(())
    }
}
