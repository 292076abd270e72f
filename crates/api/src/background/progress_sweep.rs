//! Periodic progress sweep.
//!
//! On a fixed interval, flags past-due milestones as overdue and then
//! recomputes every active project's progress. Runs on
//! `tokio::time::interval`; the first sweep happens immediately.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use helios_core::error::CoreError;
use helios_core::progress::{BatchRecalculation, ProgressTracker};
use helios_core::types::Timestamp;
use tokio_util::sync::CancellationToken;

/// Outcome of one sweep.
#[derive(Debug)]
pub struct SweepReport {
    pub flagged_overdue: usize,
    pub recalculation: BatchRecalculation,
}

/// Run a single sweep as of `now`.
pub async fn sweep_once(
    tracker: &ProgressTracker,
    now: Timestamp,
) -> Result<SweepReport, CoreError> {
    let flagged_overdue = tracker.flag_overdue_milestones(now).await?;
    let recalculation = tracker.recalculate_all_projects_progress().await?;
    Ok(SweepReport {
        flagged_overdue,
        recalculation,
    })
}

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(tracker: Arc<ProgressTracker>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Progress sweep started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Progress sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&tracker, Utc::now()).await {
                    Ok(report) => tracing::info!(
                        flagged_overdue = report.flagged_overdue,
                        processed = report.recalculation.processed,
                        completed_now = report.recalculation.completed_now.len(),
                        failed = report.recalculation.failures.len(),
                        "Progress sweep finished"
                    ),
                    Err(e) => tracing::error!(error = %e, "Progress sweep failed"),
                }
            }
        }
    }
}
