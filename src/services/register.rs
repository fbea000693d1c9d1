use tonic::{Request, Response, Status};
use crate::{grpc::api, model::{algorithm, user::{looks_like_email, normalise_email, User}}, utils::{context::ServiceContext, errors::{AgriError, ErrorCode}, generate_id}};
use super::auth::auth_response;

pub async fn register(ctx: &ServiceContext, request: Request<api::RegisterRequest>)
    -> Result<Response<api::AuthResponse>, Status> {

    let request = request.into_inner();
    let user = create_local_user(ctx, &request.name, &request.email, &request.password).await?;
    Ok(Response::new(auth_response(ctx, &user)?))
}

pub async fn create_local_user(ctx: &ServiceContext, name: &str, email: &str, password: &str) -> Result<User, AgriError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ErrorCode::NameMandatory.with_msg("Name is required"))
    }

    let email = normalise_email(email);
    if !looks_like_email(&email) {
        return Err(ErrorCode::InvalidEmail.with_msg("Please enter a valid email address"))
    }

    check_password_length(ctx, password)?;

    if ctx.users().find_by_email(&email).await?.is_some() {
        return Err(ErrorCode::EmailAlreadyRegistered.with_msg("User with this email already exists"))
    }

    let phc = algorithm::hash_blocking(ctx.argon_policy(), password).await?;
    let user = User::new_local(generate_id(), name, &email, phc, ctx.now());

    // The store enforces uniqueness too, should a concurrent registration win the race.
    ctx.users().create(&user).await?;

    tracing::info!("Registered user {}", user.user_id);
    Ok(user)
}

pub fn check_password_length(ctx: &ServiceContext, password: &str) -> Result<(), AgriError> {
    let min_length = ctx.config().min_password_length;

    match password.chars().count() < min_length {
        true  => Err(ErrorCode::PasswordTooShort.with_msg(&format!("Password must be at least {} characters", min_length))),
        false => Ok(()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::user::AuthProvider, services::testing::*};

    #[tokio::test]
    async fn test_register_normalises_and_hashes() -> Result<(), AgriError> {
        let (ctx, _notifier) = context(&[]);
        let user = create_local_user(&ctx, " Asha ", " Asha@Example.COM ", "secret1").await?;

        assert_eq!(user.name, "Asha");
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.auth_provider, AuthProvider::Local);
        assert!(algorithm::validate("secret1", user.phc.as_deref().unwrap())?);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() -> Result<(), AgriError> {
        let (ctx, _notifier) = context(&[]);
        create_local_user(&ctx, "Asha", "asha@example.com", "secret1").await?;

        let error = create_local_user(&ctx, "Asha", "ASHA@example.com", "secret1").await.unwrap_err();
        assert_eq!(error.error_code(), ErrorCode::EmailAlreadyRegistered);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_fields_are_rejected() {
        let (ctx, _notifier) = context(&[]);

        assert_eq!(create_local_user(&ctx, "  ", "a@x.com", "secret1").await.unwrap_err().error_code(), ErrorCode::NameMandatory);
        assert_eq!(create_local_user(&ctx, "Asha", "not-an-email", "secret1").await.unwrap_err().error_code(), ErrorCode::InvalidEmail);
        assert_eq!(create_local_user(&ctx, "Asha", "a@x.com", "12345").await.unwrap_err().error_code(), ErrorCode::PasswordTooShort);
    }
}
