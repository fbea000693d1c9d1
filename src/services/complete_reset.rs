use tonic::{Request, Response, Status};
use crate::{grpc::{api, common}, model::{algorithm, reset::{ResetError, Rejection}, user::normalise_email}, utils::context::ServiceContext};
use super::lockout;

pub async fn complete_reset(ctx: &ServiceContext, request: Request<api::CompleteResetRequest>)
    -> Result<Response<common::MessageResponse>, Status> {

    let request = request.into_inner();

    change_password(ctx, &request.email, &request.new_password).await?;

    Ok(Response::new(common::MessageResponse {
        message: "Password reset successfully. Please login with your new password".to_string()
    }))
}

///
/// Set the user's new password and consume their OTP.
///
/// Any live OTP authorises the change. The attempt ledger is not consulted.
///
pub async fn change_password(ctx: &ServiceContext, email: &str, new_password: &str) -> Result<(), ResetError> {
    let email = normalise_email(email);
    let now = ctx.now();

    let user = lockout::local_user(ctx, &email).await?;

    if ctx.otps().get(&user.user_id, now).await?.is_none() {
        return Err(Rejection::VerificationRequired.into())
    }

    let min_length = ctx.config().min_password_length;
    if new_password.chars().count() < min_length {
        return Err(Rejection::PasswordTooShort { min_length }.into())
    }

    // Hash the new password in a blocking thread.
    let phc = algorithm::hash_blocking(ctx.argon_policy(), new_password).await?;

    ctx.users().update_password(&user.user_id, &phc, now).await?;
    ctx.otps().delete(&user.user_id).await?;

    tracing::info!("Password reset completed for user {}", user.user_id);
    Ok(())
}
