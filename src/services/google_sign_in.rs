use tonic::{Request, Response, Status};
use crate::{grpc::api, model::user::User, utils::{context::ServiceContext, errors::{AgriError, ErrorCode}, generate_id}};
use super::auth::auth_response;

pub async fn google_sign_in(ctx: &ServiceContext, request: Request<api::GoogleSignInRequest>)
    -> Result<Response<api::AuthResponse>, Status> {

    let request = request.into_inner();
    let user = sign_in(ctx, &request.id_token).await?;
    Ok(Response::new(auth_response(ctx, &user)?))
}

///
/// Sign in with a provider ID token, creating a federated account on first use.
///
pub async fn sign_in(ctx: &ServiceContext, id_token: &str) -> Result<User, AgriError> {
    let identity = ctx.identity().verify(id_token).await?
        .ok_or_else(|| ErrorCode::InvalidIdentityToken.with_msg("Invalid Google token"))?;

    if !identity.email_verified {
        return Err(ErrorCode::EmailNotVerified.with_msg("Google email is not verified"))
    }

    let now = ctx.now();

    match ctx.users().find_by_email(&identity.email).await? {
        Some(user) if !user.is_federated() => {
            Err(ErrorCode::AccountExistsWithPassword
                .with_msg("An account with this email already exists. Please login with your email and password."))
        },
        Some(mut user) => {
            ctx.users().record_login(&user.user_id, identity.picture.as_deref(), now).await?;
            user.updated_at = now;
            user.last_login = Some(now);
            if identity.picture.is_some() {
                user.profile_image_url = identity.picture;
            }
            Ok(user)
        },
        None => {
            let user = User::new_federated(generate_id(), &identity, now);
            ctx.users().create(&user).await?;
            tracing::info!("Created Google account {}", user.user_id);
            Ok(user)
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::user::AuthProvider, services::testing::*};

    #[tokio::test]
    async fn test_first_sign_in_creates_a_passwordless_account() -> Result<(), AgriError> {
        let (ctx, _notifier) = context_with_identity(&[], Some(identity("ravi@x.com")));

        let user = sign_in(&ctx, "token").await?;
        assert_eq!(user.auth_provider, AuthProvider::Google);
        assert_eq!(user.phc, None);
        assert_eq!(user.name, "Ravi");

        // Signing in again finds the same account.
        let again = sign_in(&ctx, "token").await?;
        assert_eq!(again.user_id, user.user_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_local_account_is_not_taken_over() {
        let (ctx, _notifier) = context_with_identity(&[], Some(identity("a@x.com")));
        local_user(&ctx, "a@x.com", "password1").await;

        assert_eq!(sign_in(&ctx, "token").await.unwrap_err().error_code(), ErrorCode::AccountExistsWithPassword);
    }

    #[tokio::test]
    async fn test_rejected_tokens() {
        let (ctx, _notifier) = context_with_identity(&[], None);
        assert_eq!(sign_in(&ctx, "token").await.unwrap_err().error_code(), ErrorCode::InvalidIdentityToken);

        let mut unverified = identity("ravi@x.com");
        unverified.email_verified = false;
        let (ctx, _notifier) = context_with_identity(&[], Some(unverified));
        assert_eq!(sign_in(&ctx, "token").await.unwrap_err().error_code(), ErrorCode::EmailNotVerified);
    }
}
