use anyhow::{Context, Error, Result};
use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, TimeZone, Utc};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Pause between attempts of a failed outbound request.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Runs `operation` up to `retries + 1` times, sleeping `delay` between
/// attempts, and returns the last error if every attempt fails.
pub async fn with_retry<F, Fut, T, E>(mut operation: F, retries: usize, delay: Duration) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    for attempt in 0..retries {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let e: Error = e.into();
                debug!(attempt = attempt + 1, of = retries + 1, error = %e, "Request failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
    operation().await.map_err(Into::into)
}

/// Time from `now` until the next `hour:minute` wall-clock time at `offset`.
/// A time equal to `now` counts as tomorrow.
pub fn duration_until(
    hour: u32,
    minute: u32,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<Duration> {
    let at = NaiveTime::from_hms_opt(hour, minute, 0)
        .with_context(|| format!("Invalid time of day {hour:02}:{minute:02}"))?;

    let local_now = now.with_timezone(&offset);
    let mut next = local_now.date_naive().and_time(at);
    if next <= local_now.naive_local() {
        next += TimeDelta::days(1);
    }

    let next = offset
        .from_local_datetime(&next)
        .single()
        .context("Ambiguous local time")?;
    (next.with_timezone(&Utc) - now)
        .to_std()
        .context("Next run lies in the past")
}
