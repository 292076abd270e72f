//! Milestone domain types and status rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Milestone status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl MilestoneStatus {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            other => Err(CoreError::Validation(format!(
                "Unknown milestone status '{other}'"
            ))),
        }
    }
}

/// A tracked sub-deliverable of a project.
///
/// `completed_date` is set if and only if `status` is `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub status: MilestoneStatus,
    pub start_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub completed_date: Option<Timestamp>,
    pub weight: i32,
    pub order_index: i32,
}

impl Milestone {
    /// Past its due date without being completed. An explicit `overdue`
    /// flag is irrelevant: only the dates and completion decide.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        !self.status.is_completed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Overdue by date but not yet flagged as such.
    pub fn needs_overdue_flag(&self, now: Timestamp) -> bool {
        self.is_overdue(now) && self.status != MilestoneStatus::Overdue
    }

    /// Weight used by weighted progress; non-positive weights count as 1.
    pub fn effective_weight(&self) -> i64 {
        i64::from(self.weight.max(1))
    }
}

/// Partial update applied to a milestone.
///
/// `completed_date` uses a nested option so it can be cleared:
/// `Some(None)` writes NULL, `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestoneUpdate {
    pub status: Option<MilestoneStatus>,
    pub completed_date: Option<Option<Timestamp>>,
}

impl MilestoneUpdate {
    /// Build the update that moves `milestone` to `status`, keeping the
    /// completed-date invariant.
    ///
    /// Re-completing an already completed milestone keeps its original
    /// completion date.
    pub fn for_status(milestone: &Milestone, status: MilestoneStatus, now: Timestamp) -> Self {
        let completed_date = if status.is_completed() {
            Some(milestone.completed_date.or(Some(now)))
        } else {
            Some(None)
        };
        Self {
            status: Some(status),
            completed_date,
        }
    }

    /// Apply this update to an in-memory milestone.
    pub fn apply(&self, milestone: &mut Milestone) {
        if let Some(status) = self.status {
            milestone.status = status;
        }
        if let Some(completed_date) = self.completed_date {
            milestone.completed_date = completed_date;
        }
    }
}
