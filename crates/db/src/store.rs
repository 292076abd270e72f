//! [`PgStore`]: the core store traits backed by Postgres.

use async_trait::async_trait;
use helios_core::error::CoreError;
use helios_core::milestone::{Milestone, MilestoneUpdate};
use helios_core::project::{Project, ProjectType, ProjectUpdate};
use helios_core::store::{MilestoneStore, ProjectStore, ProjectTypeStore};
use helios_core::types::{DbId, Timestamp};

use crate::repositories::{MilestoneRepo, ProjectRepo, ProjectTypeRepo};
use crate::DbPool;

/// Store handle wrapping a connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(err: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("Database error: {err}"))
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, CoreError>
where
    T: TryFrom<R, Error = CoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl MilestoneStore for PgStore {
    async fn get_milestone_by_id(&self, id: DbId) -> Result<Option<Milestone>, CoreError> {
        MilestoneRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .map(Milestone::try_from)
            .transpose()
    }

    async fn get_milestones_by_project(
        &self,
        project_id: DbId,
    ) -> Result<Vec<Milestone>, CoreError> {
        let rows = MilestoneRepo::list_by_project(&self.pool, project_id)
            .await
            .map_err(db_error)?;
        convert_all(rows)
    }

    async fn get_all_milestones(&self) -> Result<Vec<Milestone>, CoreError> {
        let rows = MilestoneRepo::list(&self.pool).await.map_err(db_error)?;
        convert_all(rows)
    }

    async fn update_milestone(
        &self,
        id: DbId,
        update: &MilestoneUpdate,
    ) -> Result<Option<Milestone>, CoreError> {
        MilestoneRepo::update(&self.pool, id, update)
            .await
            .map_err(db_error)?
            .map(Milestone::try_from)
            .transpose()
    }

    async fn flag_milestone_overdue(
        &self,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Milestone>, CoreError> {
        MilestoneRepo::flag_overdue(&self.pool, id, now)
            .await
            .map_err(db_error)?
            .map(Milestone::try_from)
            .transpose()
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn get_project_by_id(&self, id: DbId) -> Result<Option<Project>, CoreError> {
        ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .map(Project::try_from)
            .transpose()
    }

    async fn get_all_projects(&self) -> Result<Vec<Project>, CoreError> {
        let rows = ProjectRepo::list(&self.pool).await.map_err(db_error)?;
        convert_all(rows)
    }

    async fn get_active_projects(&self) -> Result<Vec<Project>, CoreError> {
        let rows = ProjectRepo::list_active(&self.pool)
            .await
            .map_err(db_error)?;
        convert_all(rows)
    }

    async fn update_project(
        &self,
        id: DbId,
        update: &ProjectUpdate,
    ) -> Result<Option<Project>, CoreError> {
        ProjectRepo::update(&self.pool, id, update)
            .await
            .map_err(db_error)?
            .map(Project::try_from)
            .transpose()
    }
}

#[async_trait]
impl ProjectTypeStore for PgStore {
    async fn get_all_project_types(&self) -> Result<Vec<ProjectType>, CoreError> {
        let rows = ProjectTypeRepo::list(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(ProjectType::from).collect())
    }
}
