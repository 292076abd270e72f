//! Project and project-type domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Fallback duration used when a project's type is unknown and no completed
/// peer projects exist.
pub const DEFAULT_PROJECT_DURATION_DAYS: i32 = 30;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Active projects are everything not yet completed or cancelled.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(Self::Planning),
            "in_progress" => Ok(Self::InProgress),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown project status '{other}'"
            ))),
        }
    }
}

/// A solar installation project.
///
/// `progress_percentage` is derived from the project's milestones and is
/// only written by the progress engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub project_type_id: DbId,
    pub status: ProjectStatus,
    pub location: Option<String>,
    pub client_name: Option<String>,
    pub start_date: Timestamp,
    pub estimated_end_date: Timestamp,
    pub actual_end_date: Option<Timestamp>,
    pub progress_percentage: i32,
}

/// Partial update applied to a project. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub progress_percentage: Option<i32>,
    /// Write-once: ignored when the project already has an end date.
    pub actual_end_date: Option<Timestamp>,
}

/// A category of installation (residential rooftop, commercial, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectType {
    pub id: DbId,
    pub name: String,
    pub estimated_duration_days: i32,
}
