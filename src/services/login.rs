use tonic::{Request, Response, Status};
use crate::{grpc::api, model::{algorithm, user::{normalise_email, User}}, utils::{context::ServiceContext, errors::{AgriError, ErrorCode}}};
use super::auth::auth_response;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn login(ctx: &ServiceContext, request: Request<api::LoginRequest>)
    -> Result<Response<api::AuthResponse>, Status> {

    let request = request.into_inner();
    let user = authenticate(ctx, &request.email, &request.password).await?;
    Ok(Response::new(auth_response(ctx, &user)?))
}

///
/// Check the password against the stored hash. An unknown email and a wrong password are
/// indistinguishable to the caller.
///
pub async fn authenticate(ctx: &ServiceContext, email: &str, password: &str) -> Result<User, AgriError> {
    let email = normalise_email(email);

    let mut user = ctx.users().find_by_email(&email).await?
        .ok_or_else(|| ErrorCode::InvalidCredentials.with_msg(INVALID_CREDENTIALS))?;

    if user.is_federated() {
        return Err(ErrorCode::UnsupportedAuthMethod
            .with_msg("This account uses Google Sign-In. Please use the 'Sign in with Google' button."))
    }

    let phc = user.phc.clone().ok_or_else(|| ErrorCode::InvalidCredentials.with_msg(INVALID_CREDENTIALS))?;

    // CPU-bound, so verified on the blocking worker thread pool.
    if !algorithm::validate_blocking(password, &phc).await? {
        tracing::info!("Failed login for user {}", user.user_id);
        return Err(ErrorCode::InvalidCredentials.with_msg(INVALID_CREDENTIALS))
    }

    let now = ctx.now();
    ctx.users().record_login(&user.user_id, None, now).await?;
    user.updated_at = now;
    user.last_login = Some(now);

    Ok(user)
}
