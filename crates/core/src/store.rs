//! Storage and notification seams consumed by the engines.
//!
//! The engines never reach for a global connection; callers hand them
//! implementations of these traits (`helios_db::PgStore` in production,
//! [`crate::memory::InMemoryStore`] in tests).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::milestone::{Milestone, MilestoneUpdate};
use crate::project::{Project, ProjectType, ProjectUpdate};
use crate::types::{DbId, Timestamp};

/// Read/write access to milestones.
#[async_trait]
pub trait MilestoneStore: Send + Sync {
    /// Find a single milestone. `None` if it does not exist.
    async fn get_milestone_by_id(&self, id: DbId) -> Result<Option<Milestone>, CoreError>;

    /// All milestones of a project, ordered by `order_index`.
    async fn get_milestones_by_project(&self, project_id: DbId)
        -> Result<Vec<Milestone>, CoreError>;

    /// Every milestone in the system.
    async fn get_all_milestones(&self) -> Result<Vec<Milestone>, CoreError>;

    /// Apply a partial update. Returns `None` if the milestone does not exist.
    async fn update_milestone(
        &self,
        id: DbId,
        update: &MilestoneUpdate,
    ) -> Result<Option<Milestone>, CoreError>;

    /// Mark a milestone `overdue` and clear its completed date, but only if
    /// it is still past due at `now` and neither completed nor already
    /// flagged when the write happens. Returns the flagged milestone, or
    /// `None` when nothing was written.
    async fn flag_milestone_overdue(
        &self,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Milestone>, CoreError>;
}

/// Read/write access to projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Find a single project. `None` if it does not exist.
    async fn get_project_by_id(&self, id: DbId) -> Result<Option<Project>, CoreError>;

    /// Every project in the system.
    async fn get_all_projects(&self) -> Result<Vec<Project>, CoreError>;

    /// Projects that are neither completed nor cancelled.
    async fn get_active_projects(&self) -> Result<Vec<Project>, CoreError>;

    /// Apply a partial update. Updating a missing project is a no-op that
    /// returns `None`.
    async fn update_project(
        &self,
        id: DbId,
        update: &ProjectUpdate,
    ) -> Result<Option<Project>, CoreError>;
}

/// Read access to project types.
#[async_trait]
pub trait ProjectTypeStore: Send + Sync {
    async fn get_all_project_types(&self) -> Result<Vec<ProjectType>, CoreError>;
}

/// Outbound notification channel.
///
/// Delivery problems are reported through the return value and never as an
/// error: callers log a `false` and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce something that happened to `project_id`.
    async fn notify(&self, project_id: DbId, title: &str, content: &str) -> bool;
}

/// Bundle of store handles shared by the engines.
///
/// Cheaply cloneable; every handle is behind an `Arc`.
#[derive(Clone)]
pub struct Stores {
    pub projects: Arc<dyn ProjectStore>,
    pub milestones: Arc<dyn MilestoneStore>,
    pub project_types: Arc<dyn ProjectTypeStore>,
}

impl Stores {
    /// Build a bundle where one value implements every store trait.
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: ProjectStore + MilestoneStore + ProjectTypeStore + 'static,
    {
        Self {
            projects: store.clone(),
            milestones: store.clone(),
            project_types: store,
        }
    }
}
