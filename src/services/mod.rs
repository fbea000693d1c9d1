mod auth;
mod complete_reset;
mod google_sign_in;
mod lockout;
mod login;
mod register;
mod request_reset;
mod set_time;
mod submit_contact;
mod verify_otp;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use tracing::instrument;
use crate::grpc::{api, admin, common};
use crate::grpc::api::accounts_server::Accounts;
use crate::grpc::admin::admin_server::Admin;
use crate::utils::context::ServiceContext;
use tonic::{Request, Response, Status};

///
/// Implemention for all the gRPC service endpoints defined in the .proto file.
///
/// Requests are never recorded on the spans - they carry passwords and OTPs.
///
#[tonic::async_trait]
impl Accounts for Arc<ServiceContext> {
    #[instrument(skip(self, request))]
    async fn register(&self, request: Request<api::RegisterRequest>) -> Result<Response<api::AuthResponse>, Status> {
        register::register(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn login(&self, request: Request<api::LoginRequest>) -> Result<Response<api::AuthResponse>, Status> {
        login::login(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn google_sign_in(&self, request: Request<api::GoogleSignInRequest>) -> Result<Response<api::AuthResponse>, Status> {
        google_sign_in::google_sign_in(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn request_reset(&self, request: Request<api::RequestResetRequest>) -> Result<Response<api::RequestResetResponse>, Status> {
        request_reset::request_reset(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn verify_otp(&self, request: Request<api::VerifyOtpRequest>) -> Result<Response<common::MessageResponse>, Status> {
        verify_otp::verify_otp(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn complete_reset(&self, request: Request<api::CompleteResetRequest>) -> Result<Response<common::MessageResponse>, Status> {
        complete_reset::complete_reset(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn submit_contact(&self, request: Request<api::ContactRequest>) -> Result<Response<common::MessageResponse>, Status> {
        submit_contact::submit_contact(self, request).await
    }
}

#[tonic::async_trait]
impl Admin for Arc<ServiceContext> {
    async fn ping(&self, _request: Request<common::Empty>) -> Result<Response<common::Empty>, Status> {
        return Ok(Response::new(common::Empty::default()))
    }

    async fn set_time(&self, request: Request<admin::NewTime>) -> Result<Response<common::Empty>, Status> {
        set_time::set_time(self, request).await
    }

    async fn reset_time(&self, request: Request<common::Empty>) -> Result<Response<common::Empty>, Status> {
        set_time::reset_time(self, request).await
    }
}
