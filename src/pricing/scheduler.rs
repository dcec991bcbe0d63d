// Daily full-catalog price refresh
//
// A plain sleep loop rather than a cron dependency: compute the duration
// to the next run, sleep it, enqueue everything, repeat.

use chrono::{DateTime, NaiveTime, Utc};
use std::time::Duration;
use tracing::{error, info};

use crate::pricing::service::PriceSyncService;

/// Hour of day (UTC) when the full catalog is re-enqueued
pub const DAILY_SYNC_HOUR_UTC: u32 = 3;

/// Run the daily full-catalog sync loop forever
pub async fn run_daily_price_sync(service: PriceSyncService) {
    info!(
        "Daily price sync scheduled for {:02}:00 UTC",
        DAILY_SYNC_HOUR_UTC
    );

    loop {
        let wait = duration_until_next(Utc::now(), DAILY_SYNC_HOUR_UTC);
        tokio::time::sleep(wait).await;

        match service.request_sync_all().await {
            Ok(count) => info!("Daily sync enqueued {} game(s)", count),
            Err(e) => error!("Daily sync could not enqueue the catalog: {:?}", e),
        }
    }
}

/// Duration from `now` to the next occurrence of `hour`:00:00 UTC
///
/// If the target time today has already passed (or is exactly now), the
/// next run is tomorrow.
fn duration_until_next(now: DateTime<Utc>, hour: u32) -> Duration {
    let target_time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut target = now.date_naive().and_time(target_time).and_utc();

    if target <= now {
        target += chrono::Duration::days(1);
    }

    (target - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 30, hour, min, 0).unwrap()
    }

    #[test]
    fn before_the_hour_waits_until_today() {
        let wait = duration_until_next(at(2, 0), DAILY_SYNC_HOUR_UTC);
        assert_eq!(wait, Duration::from_secs(3600));
    }

    #[test]
    fn exactly_at_the_hour_waits_a_full_day() {
        let wait = duration_until_next(at(3, 0), DAILY_SYNC_HOUR_UTC);
        assert_eq!(wait, Duration::from_secs(24 * 3600));
    }

    #[test]
    fn after_the_hour_waits_until_tomorrow() {
        let wait = duration_until_next(at(4, 0), DAILY_SYNC_HOUR_UTC);
        assert_eq!(wait, Duration::from_secs(23 * 3600));
    }
}
