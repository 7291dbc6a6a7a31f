use crate::core::CacheManager;
use crate::core::config::ScheduleConfig;
use crate::pipeline::{Pipeline, RunOutcome};
use crate::providers::util::duration_until;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const FALLBACK_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Loads the last persisted generations so the API can serve before the
/// first scheduled run. Never fails; a broken cache just means "not ready".
pub async fn load_on_startup(cache: &CacheManager) -> usize {
    match cache.load_from_store().await {
        Ok(count) => count,
        Err(e) => {
            warn!(error = ?e, "Could not load cached NAV data, serving not ready");
            0
        }
    }
}

/// Runs the pipeline once and detaches its enrichment task.
pub async fn trigger(pipeline: &Pipeline) {
    match pipeline.run().await {
        Ok(RunOutcome::Started(report)) => {
            info!(
                cleaned = report.cleaned,
                "Scheduled run wrote cleaned and shuffled generations"
            );
        }
        Ok(RunOutcome::Skipped) => {}
        Err(e) => error!(error = ?e, "Pipeline run failed, keeping previous cache"),
    }
}

/// Spawns the daily refresh loop.
pub fn spawn_daily(pipeline: Arc<Pipeline>, schedule: ScheduleConfig) -> Result<JoinHandle<()>> {
    let offset = schedule.offset()?;
    Ok(tokio::spawn(async move {
        if schedule.run_on_start {
            trigger(&pipeline).await;
        }
        loop {
            let wait = duration_until(schedule.hour, schedule.minute, offset, chrono::Utc::now())
                .unwrap_or_else(|e| {
                    warn!("Failed calculating next run: {}. Using fallback 1 day", e);
                    FALLBACK_PERIOD
                });
            info!(
                at = %format!("{:02}:{:02}", schedule.hour, schedule.minute),
                %offset,
                wait_secs = wait.as_secs(),
                "Next NAV refresh scheduled"
            );
            tokio::time::sleep(wait).await;
            trigger(&pipeline).await;
        }
    }))
}
