use chrono::{DateTime, Utc};
use tonic::{Request, Response, Status};
use crate::{grpc::{admin, common}, utils::context::ServiceContext};

///
/// Moving the clock lifts blocks and revives OTPs, so it is refused unless admin_enabled is set.
///
fn ensure_enabled(ctx: &ServiceContext) -> Result<(), Status> {
    match ctx.config().admin_enabled {
        true  => Ok(()),
        false => {
            tracing::warn!("Refused an admin clock change - admin_enabled is off");
            Err(Status::permission_denied("The admin service is disabled"))
        },
    }
}

///
/// Pin the service clock, so OTP expiry and reset blocks can be stepped through without waiting.
///
pub async fn set_time(ctx: &ServiceContext, request: Request<admin::NewTime>)
    -> Result<Response<common::Empty>, Status> {

    ensure_enabled(ctx)?;
    let new_time = request.into_inner().new_time;

    let fixed = DateTime::parse_from_rfc3339(&new_time)
        .map_err(|err| Status::invalid_argument(format!("new_time {} is not an RFC3339 timestamp: {}", new_time, err)))?
        .with_timezone(&Utc);

    ctx.set_now(Some(fixed));
    tracing::info!("Service clock fixed at {}", fixed.to_rfc3339());
    Ok(Response::new(common::Empty::default()))
}

///
/// Return to the system clock.
///
pub async fn reset_time(ctx: &ServiceContext, _request: Request<common::Empty>)
    -> Result<Response<common::Empty>, Status> {

    ensure_enabled(ctx)?;
    if ctx.time_fixed() {
        ctx.set_now(None);
        tracing::info!("Service clock following system time again");
    }
    Ok(Response::new(common::Empty::default()))
}
