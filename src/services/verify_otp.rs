use tonic::{Request, Response, Status};
use crate::{grpc::{api, common}, model::{algorithm, reset::{ResetError, Rejection}, user::normalise_email}, utils::context::ServiceContext};
use super::lockout;

pub async fn verify_otp(ctx: &ServiceContext, request: Request<api::VerifyOtpRequest>)
    -> Result<Response<common::MessageResponse>, Status> {

    let request = request.into_inner();

    check_otp(ctx, &request.email, &request.otp).await?;

    Ok(Response::new(common::MessageResponse { message: "OTP verified successfully".to_string() }))
}

///
/// Compare the submitted code with the user's live OTP.
///
/// A match clears the user's attempt history and leaves the OTP in place to authorise the reset.
/// A miss is counted, and the user is blocked once they reach the configured maximum.
///
pub async fn check_otp(ctx: &ServiceContext, email: &str, submitted: &str) -> Result<(), ResetError> {
    let email = normalise_email(email);
    let now = ctx.now();

    // An unknown email looks the same as a missing code.
    let user = ctx.users().find_by_email(&email).await?.ok_or(Rejection::InvalidOrExpired)?;
    lockout::ensure_local(&user)?;

    let record = ctx.otps().get(&user.user_id, now).await?.ok_or(Rejection::InvalidOrExpired)?;

    lockout::ensure_not_blocked(ctx, &user, now).await?;

    if algorithm::validate_blocking(submitted, &record.otp_phc).await? {
        ctx.ledger().delete(&user.user_id).await?;
        tracing::info!("Reset OTP verified for user {}", user.user_id);
        return Ok(())
    }

    let max_attempts = ctx.config().max_reset_attempts;
    let block_for = ctx.config().reset_block();

    // The increment and the block decision are a single atomic store update.
    let entry = ctx.ledger().record_failure(&user.user_id, now, max_attempts, block_for).await?;

    if entry.attempts >= max_attempts {
        tracing::warn!("User {} blocked from password reset after {} failed attempts", user.user_id, entry.attempts);
        return Err(Rejection::MaxAttemptsReached { max_attempts, blocked_for: block_for }.into())
    }

    Err(Rejection::InvalidOtp { attempts_remaining: max_attempts - entry.attempts }.into())
}
