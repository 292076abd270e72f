//! Project progress derivation and completion detection.
//!
//! The percentage itself is a pure function of a project's milestones
//! ([`compute_progress`]). [`ProgressTracker`] wraps it with the
//! read-modify-write against the stores, diffs the old and new values, and
//! dispatches the completion notification on the 0..99 -> 100 edge.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::dates::{days_between, percentage};
use crate::error::CoreError;
use crate::milestone::{Milestone, MilestoneStatus, MilestoneUpdate};
use crate::project::{Project, ProjectUpdate};
use crate::store::{Notifier, Stores};
use crate::types::{DbId, Timestamp};

/// Percentage at which a project counts as complete.
pub const COMPLETE_PERCENTAGE: i32 = 100;

// ---------------------------------------------------------------------------
// Pure computation
// ---------------------------------------------------------------------------

/// How milestones contribute to a project's percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressWeighting {
    /// Every milestone counts once: `completed / total`.
    #[default]
    Count,
    /// Milestones count by weight: `sum(completed weight) / sum(weight)`.
    Weighted,
}

impl FromStr for ProgressWeighting {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(Self::Count),
            "weighted" => Ok(Self::Weighted),
            other => Err(CoreError::Validation(format!(
                "Unknown progress weighting '{other}' (expected 'count' or 'weighted')"
            ))),
        }
    }
}

/// Completion percentage (0-100) of a set of milestones.
///
/// An empty set is 0%, never NaN.
pub fn compute_progress(milestones: &[Milestone], weighting: ProgressWeighting) -> i32 {
    let (done, total) = match weighting {
        ProgressWeighting::Count => {
            let done = milestones.iter().filter(|m| m.status.is_completed()).count();
            (done as i64, milestones.len() as i64)
        }
        ProgressWeighting::Weighted => milestones.iter().fold((0, 0), |(done, total), m| {
            let w = m.effective_weight();
            let done = if m.status.is_completed() { done + w } else { done };
            (done, total + w)
        }),
    };
    percentage(done, total) as i32
}

/// Old and new percentage of a single recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressChange {
    pub project_id: DbId,
    /// `None` when the project record could not be found.
    pub previous: Option<i32>,
    pub current: i32,
}

impl ProgressChange {
    /// True exactly on the transition from below 100% to 100%.
    pub fn reached_completion(&self) -> bool {
        self.current == COMPLETE_PERCENTAGE
            && self.previous.is_some_and(|p| p < COMPLETE_PERCENTAGE)
    }
}

/// Title and body of a project-completed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub title: String,
    pub content: String,
}

/// Build the completion notice for `project`, finished at `now`.
pub fn completion_notice(project: &Project, now: Timestamp) -> CompletionNotice {
    let duration_days = days_between(project.start_date, now);
    let location = project.location.as_deref().unwrap_or("an unspecified location");
    let client = project.client_name.as_deref().unwrap_or("an unspecified client");
    CompletionNotice {
        title: format!("Project completed: {}", project.name),
        content: format!(
            "{} at {location} for {client} reached 100% after {duration_days} days.",
            project.name
        ),
    }
}

// ---------------------------------------------------------------------------
// Per-project locking
// ---------------------------------------------------------------------------

/// Async lock per project id, so that two recomputations of the same project
/// never interleave their read and write.
#[derive(Default)]
struct ProjectLocks {
    locks: Mutex<HashMap<DbId, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    async fn acquire(&self, project_id: DbId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries only referenced by the map are idle.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(project_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// A project that failed during a batch recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFailure {
    pub project_id: DbId,
    pub error: String,
}

/// Outcome of [`ProgressTracker::recalculate_all_projects_progress`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchRecalculation {
    pub processed: usize,
    pub completed_now: Vec<DbId>,
    pub failures: Vec<ProjectFailure>,
}

/// Result of moving a milestone to a new status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneStatusChange {
    pub milestone: Milestone,
    pub progress: ProgressChange,
}

/// Keeps `progress_percentage` in step with milestone state.
pub struct ProgressTracker {
    stores: Stores,
    notifier: Arc<dyn Notifier>,
    weighting: ProgressWeighting,
    locks: ProjectLocks,
}

impl ProgressTracker {
    pub fn new(stores: Stores, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            stores,
            notifier,
            weighting: ProgressWeighting::default(),
            locks: ProjectLocks::default(),
        }
    }

    /// Use a different milestone weighting.
    pub fn with_weighting(mut self, weighting: ProgressWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Recompute and persist one project's percentage.
    pub async fn recalculate_project_progress(
        &self,
        project_id: DbId,
    ) -> Result<ProgressChange, CoreError> {
        self.recalculate_at(project_id, Utc::now()).await
    }

    /// [`recalculate_project_progress`](Self::recalculate_project_progress)
    /// with an explicit clock.
    ///
    /// The project lock covers the read and the write only; the completion
    /// notification is sent after it is released.
    pub async fn recalculate_at(
        &self,
        project_id: DbId,
        now: Timestamp,
    ) -> Result<ProgressChange, CoreError> {
        let guard = self.locks.acquire(project_id).await;

        let milestones = self
            .stores
            .milestones
            .get_milestones_by_project(project_id)
            .await?;
        let current = compute_progress(&milestones, self.weighting);

        let project = self.stores.projects.get_project_by_id(project_id).await?;
        let change = ProgressChange {
            project_id,
            previous: project.as_ref().map(|p| p.progress_percentage),
            current,
        };

        let stamp_end_date = current == COMPLETE_PERCENTAGE
            && project.as_ref().is_some_and(|p| p.actual_end_date.is_none());
        let update = ProjectUpdate {
            progress_percentage: Some(current),
            actual_end_date: stamp_end_date.then_some(now),
        };
        self.stores.projects.update_project(project_id, &update).await?;
        drop(guard);

        tracing::debug!(
            project_id,
            previous = ?change.previous,
            current,
            milestones = milestones.len(),
            "Project progress recalculated"
        );

        if change.reached_completion() {
            if let Some(project) = &project {
                self.dispatch_completion(project, now).await;
            }
        }

        Ok(change)
    }

    /// Recompute every project that is not completed or cancelled.
    ///
    /// A failure on one project is recorded and does not stop the others.
    /// Only a failure to list the projects is returned as an error.
    pub async fn recalculate_all_projects_progress(
        &self,
    ) -> Result<BatchRecalculation, CoreError> {
        let projects = self.stores.projects.get_active_projects().await?;
        let now = Utc::now();
        let mut report = BatchRecalculation::default();

        for project in projects {
            match self.recalculate_at(project.id, now).await {
                Ok(change) => {
                    report.processed += 1;
                    if change.reached_completion() {
                        report.completed_now.push(project.id);
                    }
                }
                Err(e) => {
                    tracing::error!(
                        project_id = project.id,
                        error = %e,
                        "Progress recalculation failed"
                    );
                    report.failures.push(ProjectFailure {
                        project_id: project.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            completed_now = report.completed_now.len(),
            failed = report.failures.len(),
            "Batch progress recalculation finished"
        );
        Ok(report)
    }

    /// Move a milestone to `status` and recompute its project.
    pub async fn set_milestone_status(
        &self,
        milestone_id: DbId,
        status: MilestoneStatus,
    ) -> Result<MilestoneStatusChange, CoreError> {
        let now = Utc::now();
        let not_found = || CoreError::NotFound {
            entity: "Milestone",
            id: milestone_id,
        };

        let existing = self
            .stores
            .milestones
            .get_milestone_by_id(milestone_id)
            .await?
            .ok_or_else(not_found)?;

        let update = MilestoneUpdate::for_status(&existing, status, now);
        let milestone = self
            .stores
            .milestones
            .update_milestone(milestone_id, &update)
            .await?
            .ok_or_else(not_found)?;

        let progress = self.recalculate_at(milestone.project_id, now).await?;
        Ok(MilestoneStatusChange {
            milestone,
            progress,
        })
    }

    /// Flag every milestone that is past due and not completed as `overdue`.
    ///
    /// The listing only selects candidates; each write re-checks the
    /// milestone, so one completed in the meantime is left alone. Returns
    /// how many milestones were flagged. A failed write is logged and
    /// skipped.
    pub async fn flag_overdue_milestones(&self, now: Timestamp) -> Result<usize, CoreError> {
        let milestones = self.stores.milestones.get_all_milestones().await?;

        let mut flagged = 0;
        for milestone in milestones.iter().filter(|m| m.needs_overdue_flag(now)) {
            match self
                .stores
                .milestones
                .flag_milestone_overdue(milestone.id, now)
                .await
            {
                Ok(Some(_)) => flagged += 1,
                Ok(None) => tracing::debug!(
                    milestone_id = milestone.id,
                    "Milestone changed before it could be flagged overdue"
                ),
                Err(e) => tracing::error!(
                    milestone_id = milestone.id,
                    error = %e,
                    "Failed to flag overdue milestone"
                ),
            }
        }

        if flagged > 0 {
            tracing::info!(flagged, "Flagged overdue milestones");
        }
        Ok(flagged)
    }

    async fn dispatch_completion(&self, project: &Project, now: Timestamp) {
        let notice = completion_notice(project, now);
        if self
            .notifier
            .notify(project.id, &notice.title, &notice.content)
            .await
        {
            tracing::info!(project_id = project.id, "Completion notification sent");
        } else {
            tracing::warn!(
                project_id = project.id,
                "Completion notification delivery failed"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
