//! Project row model.

use helios_core::error::CoreError;
use helios_core::project::Project;
use helios_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub name: String,
    pub project_type_id: DbId,
    pub status: String,
    pub location: Option<String>,
    pub client_name: Option<String>,
    pub start_date: Timestamp,
    pub estimated_end_date: Timestamp,
    pub actual_end_date: Option<Timestamp>,
    pub progress_percentage: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ProjectRow> for Project {
    type Error = CoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: row.id,
            name: row.name,
            project_type_id: row.project_type_id,
            status: row.status.parse()?,
            location: row.location,
            client_name: row.client_name,
            start_date: row.start_date,
            estimated_end_date: row.estimated_end_date,
            actual_end_date: row.actual_end_date,
            progress_percentage: row.progress_percentage,
        })
    }
}
