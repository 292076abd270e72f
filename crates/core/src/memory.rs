//! In-memory implementations of the store and notifier traits.
//!
//! Used by the engine tests and by API tests that do not need Postgres.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::CoreError;
use crate::milestone::{Milestone, MilestoneStatus, MilestoneUpdate};
use crate::project::{Project, ProjectType, ProjectUpdate};
use crate::store::{MilestoneStore, Notifier, ProjectStore, ProjectTypeStore};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// InMemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    projects: BTreeMap<DbId, Project>,
    milestones: BTreeMap<DbId, Milestone>,
    project_types: BTreeMap<DbId, ProjectType>,
    /// Projects whose milestone reads fail, for error-isolation tests.
    broken_projects: HashSet<DbId>,
}

/// A process-local store holding projects, milestones and project types.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a project.
    pub async fn put_project(&self, project: Project) {
        self.tables.write().await.projects.insert(project.id, project);
    }

    /// Insert or replace a milestone.
    pub async fn put_milestone(&self, milestone: Milestone) {
        self.tables
            .write()
            .await
            .milestones
            .insert(milestone.id, milestone);
    }

    /// Insert or replace a project type.
    pub async fn put_project_type(&self, project_type: ProjectType) {
        self.tables
            .write()
            .await
            .project_types
            .insert(project_type.id, project_type);
    }

    /// Make every milestone read for `project_id` fail with an internal error.
    pub async fn break_project(&self, project_id: DbId) {
        self.tables.write().await.broken_projects.insert(project_id);
    }
}

#[async_trait]
impl MilestoneStore for InMemoryStore {
    async fn get_milestone_by_id(&self, id: DbId) -> Result<Option<Milestone>, CoreError> {
        Ok(self.tables.read().await.milestones.get(&id).cloned())
    }

    async fn get_milestones_by_project(
        &self,
        project_id: DbId,
    ) -> Result<Vec<Milestone>, CoreError> {
        let tables = self.tables.read().await;
        if tables.broken_projects.contains(&project_id) {
            return Err(CoreError::Internal(format!(
                "milestone read failed for project {project_id}"
            )));
        }
        let mut milestones: Vec<Milestone> = tables
            .milestones
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        milestones.sort_by_key(|m| (m.order_index, m.id));
        Ok(milestones)
    }

    async fn get_all_milestones(&self) -> Result<Vec<Milestone>, CoreError> {
        Ok(self.tables.read().await.milestones.values().cloned().collect())
    }

    async fn update_milestone(
        &self,
        id: DbId,
        update: &MilestoneUpdate,
    ) -> Result<Option<Milestone>, CoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.milestones.get_mut(&id).map(|m| {
            update.apply(m);
            m.clone()
        }))
    }

    async fn flag_milestone_overdue(
        &self,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Milestone>, CoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .milestones
            .get_mut(&id)
            .filter(|m| m.needs_overdue_flag(now))
            .map(|m| {
                m.status = MilestoneStatus::Overdue;
                m.completed_date = None;
                m.clone()
            }))
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn get_project_by_id(&self, id: DbId) -> Result<Option<Project>, CoreError> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn get_all_projects(&self) -> Result<Vec<Project>, CoreError> {
        Ok(self.tables.read().await.projects.values().cloned().collect())
    }

    async fn get_active_projects(&self) -> Result<Vec<Project>, CoreError> {
        Ok(self
            .tables
            .read()
            .await
            .projects
            .values()
            .filter(|p| p.status.is_active())
            .cloned()
            .collect())
    }

    async fn update_project(
        &self,
        id: DbId,
        update: &ProjectUpdate,
    ) -> Result<Option<Project>, CoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.get_mut(&id).map(|p| {
            if let Some(progress) = update.progress_percentage {
                p.progress_percentage = progress;
            }
            if let Some(end) = update.actual_end_date {
                p.actual_end_date.get_or_insert(end);
            }
            p.clone()
        }))
    }
}

#[async_trait]
impl ProjectTypeStore for InMemoryStore {
    async fn get_all_project_types(&self) -> Result<Vec<ProjectType>, CoreError> {
        Ok(self
            .tables
            .read()
            .await
            .project_types
            .values()
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub project_id: DbId,
    pub title: String,
    pub content: String,
}

/// Notifier that records every call and reports a fixed delivery outcome.
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    succeed: bool,
}

impl RecordingNotifier {
    /// A notifier whose deliveries always succeed.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            succeed: true,
        }
    }

    /// A notifier whose deliveries always fail (but are still recorded).
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            succeed: false,
        }
    }

    /// Every notification attempted so far.
    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, project_id: DbId, title: &str, content: &str) -> bool {
        self.sent.lock().await.push(SentNotification {
            project_id,
            title: title.to_string(),
            content: content.to_string(),
        });
        self.succeed
    }
}
