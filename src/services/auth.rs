use crate::{grpc::api, model::user::User, utils::{context::ServiceContext, errors::AgriError, token}};

///
/// The signed-in response for a user, with a fresh session token.
///
pub fn auth_response(ctx: &ServiceContext, user: &User) -> Result<api::AuthResponse, AgriError> {
    Ok(api::AuthResponse {
        user_id: user.user_id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        token: token::issue_token(ctx.config(), &user.user_id, ctx.now())?,
        role: user.role.clone(),
        created_at: user.created_at.to_rfc3339(),
        updated_at: user.updated_at.to_rfc3339(),
    })
}
