//! Repository for the `projects` table.

use helios_core::project::ProjectUpdate;
use helios_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::ProjectRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, project_type_id, status, location, client_name, \
    start_date, estimated_end_date, actual_end_date, progress_percentage, \
    created_at, updated_at";

/// Provides read and progress-update operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY id ASC");
        sqlx::query_as::<_, ProjectRow>(&query).fetch_all(pool).await
    }

    /// List projects that are neither completed nor cancelled.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE status NOT IN ('completed', 'cancelled') \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ProjectRow>(&query).fetch_all(pool).await
    }

    /// Update a project's progress and end date.
    ///
    /// `None` fields are left untouched, and an existing `actual_end_date`
    /// is never overwritten. Returns `None` if no row with the given `id`
    /// exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProjectUpdate,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                progress_percentage = COALESCE($2, progress_percentage),
                actual_end_date = COALESCE(actual_end_date, $3),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(input.progress_percentage)
            .bind(input.actual_end_date)
            .fetch_optional(pool)
            .await
    }
}
