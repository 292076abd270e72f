//! Repository for the `project_types` table.

use sqlx::PgPool;

use crate::models::project_type::ProjectTypeRow;

/// Column list for `project_types` queries.
const COLUMNS: &str = "id, name, estimated_duration_days, created_at, updated_at";

/// Provides read operations for project types.
pub struct ProjectTypeRepo;

impl ProjectTypeRepo {
    /// List all project types ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<ProjectTypeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_types ORDER BY name ASC");
        sqlx::query_as::<_, ProjectTypeRow>(&query)
            .fetch_all(pool)
            .await
    }
}
