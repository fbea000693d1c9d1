use std::{sync::Arc, time::Duration};
use super::context::ServiceContext;
use tonic_health::{ServingStatus, server::HealthReporter, proto::health_server::{Health, HealthServer}};

const LIVELINESS: &str = "LIVELINESS";
const READINESS:  &str = "READINESS";

const PULSE: u64 = 4000;
const TIMEOUT: u64 = 6000;

///
/// Create a readiness monitor to response to readiness probes.
///
/// If the backing store cannot be reached it will return NOT_SERVING.
///
pub async fn start(ctx: Arc<ServiceContext>) -> (HealthReporter, HealthServer<impl Health>) {
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter.set_service_status(LIVELINESS, ServingStatus::Serving).await;
    health_reporter.set_service_status(READINESS, ServingStatus::Serving).await;

    tokio::spawn(monitor(ctx, health_reporter.clone()));
    tracing::info!("Health probe enabled for services {} and {}", LIVELINESS, READINESS);
    (health_reporter, health_service)
}

pub async fn shutdown(mut health_reporter: HealthReporter) {
    health_reporter.set_service_status(LIVELINESS, ServingStatus::NotServing).await;
    health_reporter.set_service_status(READINESS, ServingStatus::NotServing).await;
}

///
/// Ping the store on each pulse and flip our readiness if it becomes un-contactable.
///
async fn monitor(ctx: Arc<ServiceContext>, mut reporter: HealthReporter) {
    let mut healthy = true;

    loop {
        tokio::time::sleep(Duration::from_millis(PULSE)).await;

        let new_healthy = store_healthy(&ctx).await;

        if new_healthy != healthy {
            if new_healthy {
                tracing::info!("Service healthy");
                reporter.set_service_status(READINESS, ServingStatus::Serving).await;

            } else {
                tracing::error!("Service NOT healthy, the store is not responding");
                reporter.set_service_status(READINESS, ServingStatus::NotServing).await;
            }
        }

        healthy = new_healthy;
    }
}

///
/// A stalled store counts as down - the ping must answer within the timeout.
///
async fn store_healthy(ctx: &ServiceContext) -> bool {
    match tokio::time::timeout(Duration::from_millis(TIMEOUT), ctx.stores().ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::trace!("Store ping failed: {}", err);
            false
        },
        Err(_) => {
            tracing::trace!("Store ping timed out after {}ms", TIMEOUT);
            false
        },
    }
}
