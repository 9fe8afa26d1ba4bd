//! Daily trigger for the digest job.
//!
//! The job fires at 00:00:03 UTC and reports on everything modified since
//! the start of the previous UTC day.

use chrono::{DateTime, Days, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use std::fmt::Display;
use std::future::Future;
use tracing::{error, info, warn};

/// Seconds after midnight UTC at which the job fires.
pub const FIRE_OFFSET_SECS: i64 = 3;

/// A firing more than this many seconds after its planned instant is past due.
pub const PAST_DUE_GRACE_SECS: i64 = 60;

/// Lower bound for the feed query: start of the previous UTC day.
#[must_use]
pub fn previous_day_lower_bound(now: DateTime<Utc>) -> String {
    let yesterday = now.date_naive() - Days::new(1);
    yesterday.format("%Y-%m-%dT00:00:00Z").to_string()
}

/// Next firing instant strictly after `now`.
#[must_use]
pub fn next_fire_after(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let today = midnight + TimeDelta::seconds(FIRE_OFFSET_SECS);
    if today > now {
        today
    } else {
        today + Days::new(1)
    }
}

/// Whether a firing at `actual` is overdue relative to `planned`.
#[must_use]
pub fn is_past_due(planned: DateTime<Utc>, actual: DateTime<Utc>) -> bool {
    actual - planned > TimeDelta::seconds(PAST_DUE_GRACE_SECS)
}

/// Validate a user-supplied lower bound (`YYYY-MM-DDTHH:MM:SSZ`).
pub fn parse_lower_bound(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_suffix('Z')
        .ok_or_else(|| format!("{raw:?} must end with 'Z' (UTC)"))?;
    NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("{raw:?} is not YYYY-MM-DDTHH:MM:SSZ: {e}"))?;
    Ok(trimmed.to_string())
}

/// Run `job` once per day at 00:00:03 UTC until Ctrl-C.
///
/// The job receives the lower bound for its run. Missed days are not
/// replayed; an overdue firing runs once and is logged as past due. A job
/// error is logged and the scheduler keeps going.
pub async fn run_daily<F, Fut, T, E>(job: F)
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    run_daily_with(Utc::now, ctrl_c(), job).await;
}

/// [`run_daily`] with an explicit clock and shutdown signal.
///
/// Sleeping uses the tokio timer, so a paused runtime drives the loop
/// when `clock` is derived from [`tokio::time::Instant`].
pub async fn run_daily_with<C, S, F, Fut, T, E>(clock: C, shutdown: S, mut job: F)
where
    C: Fn() -> DateTime<Utc>,
    S: Future<Output = ()>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    tokio::pin!(shutdown);

    loop {
        let now = clock();
        let planned = next_fire_after(now);
        let wait = (planned - now).to_std().unwrap_or_default();

        info!(next_run = %planned, "Waiting for next scheduled run");

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            () = &mut shutdown => {
                info!("Shutdown requested, stopping scheduler");
                return;
            }
        }

        let fired = clock();
        if is_past_due(planned, fired) {
            warn!(planned = %planned, fired = %fired, "The timer is past due");
        }

        let since = previous_day_lower_bound(fired);
        info!(since = %since, "Fetching Azure updates modified since lower bound");
        match job(since.clone()).await {
            Ok(_) => info!("Scheduled digest run finished"),
            Err(e) => error!(since = %since, error = %e, "Scheduled digest run failed"),
        }
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C; scheduler runs until killed");
        std::future::pending::<()>().await;
    }
}
