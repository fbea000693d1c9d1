use std::{sync::Arc, time::Duration};
use super::{context::ServiceContext, errors::AgriError};

///
/// Periodically remove expired OTPs and lapsed blocks. The stores already ignore them on read, so
/// this only keeps storage tidy. Mongo's TTL indexes do the same job, slower.
///
pub async fn run(ctx: Arc<ServiceContext>) {
    let interval = Duration::from_secs(ctx.config().reaper_interval_seconds.max(1));
    tracing::info!("Reaping expired reset state every {:?}", interval);

    loop {
        tokio::time::sleep(interval).await;

        if let Err(err) = reap(&ctx).await {
            tracing::warn!("Unable to purge expired reset state: {}", err);
        }
    }
}

pub async fn reap(ctx: &ServiceContext) -> Result<(u64, u64), AgriError> {
    let now = ctx.now();
    let otps = ctx.otps().purge_expired(now).await?;
    let entries = ctx.ledger().purge_expired(now).await?;

    if otps + entries > 0 {
        tracing::debug!("Purged {} expired OTPs and {} ledger entries", otps, entries);
    }

    Ok((otps, entries))
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use crate::{db::Stores, model::otp::OtpRecord, utils::config::Configuration};

    #[tokio::test]
    async fn test_only_expired_state_is_reaped() -> Result<(), AgriError> {
        let ctx = ServiceContext::new(Configuration::default(), Stores::memory())?;
        let noon = Utc.ymd(2024, 3, 1).and_hms(12, 0, 0);

        for (user_id, expires_at) in vec![("expired", noon), ("live", noon + Duration::minutes(5))] {
            ctx.otps().upsert(&OtpRecord {
                user_id: user_id.to_string(),
                email: format!("{}@x.com", user_id),
                otp_phc: "phc".to_string(),
                created_at: noon - Duration::minutes(5),
                expires_at,
            }).await?;
        }
        ctx.ledger().record_failure("blocked", noon - Duration::hours(2), 1, Duration::hours(1)).await?;

        ctx.set_now(Some(noon));
        assert_eq!(reap(&ctx).await?, (1, 1));
        assert!(ctx.otps().get("live", noon).await?.is_some());
        Ok(())
    }
}
