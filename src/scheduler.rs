//! Daily schedule wrapper around the batch runner.
//!
//! Owns an explicit start/stop handle instead of a process-global cron
//! registration, so tests can call `PriceChecker::run_batch_check` directly
//! without waiting on wall-clock time. Fires at a fixed local time in a
//! fixed timezone; if the process is down at the scheduled instant, that
//! day's run is skipped.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::error::TrackerError;
use crate::services::checker::PriceChecker;

pub struct DailySchedule {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for DailySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailySchedule").finish_non_exhaustive()
    }
}

impl DailySchedule {
    /// Registers the batch job and starts firing. `cron` is a 6-field
    /// expression (sec min hour dom mon dow) evaluated in `timezone`.
    pub async fn start(
        checker: Arc<PriceChecker>,
        cron: &str,
        timezone: &str,
    ) -> Result<Self, TrackerError> {
        let tz: chrono_tz::Tz = timezone
            .parse()
            .map_err(|_| TrackerError::Schedule(format!("unknown timezone {timezone:?}")))?;

        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async_tz(cron, tz, move |_uuid, _lock| {
            let checker = checker.clone();
            Box::pin(async move {
                // Overlap is handled by the checker's run lock; the only
                // failure surfacing here is the fatal product-listing one.
                if let Err(e) = checker.run_batch_check().await {
                    tracing::error!(error = %e, "scheduled price check failed");
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        tracing::info!(cron, timezone, "daily price check scheduled");

        Ok(Self { scheduler })
    }

    pub async fn stop(&mut self) -> Result<(), TrackerError> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
