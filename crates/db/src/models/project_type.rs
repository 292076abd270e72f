//! Project type row model.

use helios_core::project::ProjectType;
use helios_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `project_types` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectTypeRow {
    pub id: DbId,
    pub name: String,
    pub estimated_duration_days: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProjectTypeRow> for ProjectType {
    fn from(row: ProjectTypeRow) -> Self {
        ProjectType {
            id: row.id,
            name: row.name,
            estimated_duration_days: row.estimated_duration_days,
        }
    }
}
