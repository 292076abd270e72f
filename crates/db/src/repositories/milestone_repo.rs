//! Repository for the `milestones` table.

use helios_core::milestone::MilestoneUpdate;
use helios_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::milestone::MilestoneRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, status, start_date, due_date, completed_date, \
    weight, order_index, created_at, updated_at";

/// Provides read and status-update operations for milestones.
pub struct MilestoneRepo;

impl MilestoneRepo {
    /// Find a milestone by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MilestoneRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milestones WHERE id = $1");
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's milestones in display order.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<MilestoneRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM milestones \
             WHERE project_id = $1 \
             ORDER BY order_index ASC, id ASC"
        );
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List every milestone.
    pub async fn list(pool: &PgPool) -> Result<Vec<MilestoneRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milestones ORDER BY id ASC");
        sqlx::query_as::<_, MilestoneRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a milestone's status and/or completed date.
    ///
    /// `completed_date` is only written when the update carries it, which
    /// allows clearing it to NULL. Returns `None` if the row does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &MilestoneUpdate,
    ) -> Result<Option<MilestoneRow>, sqlx::Error> {
        let query = format!(
            "UPDATE milestones SET
                status = COALESCE($2, status),
                completed_date = CASE WHEN $3 THEN $4 ELSE completed_date END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(id)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.completed_date.is_some())
            .bind(input.completed_date.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Flag a milestone as overdue if, at the moment of writing, it is past
    /// due and neither completed nor already flagged.
    ///
    /// Returns `None` when the row does not exist or no longer qualifies.
    pub async fn flag_overdue(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<MilestoneRow>, sqlx::Error> {
        let query = format!(
            "UPDATE milestones SET
                status = 'overdue',
                completed_date = NULL,
                updated_at = NOW()
             WHERE id = $1
               AND status NOT IN ('completed', 'overdue')
               AND due_date < $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MilestoneRow>(&query)
            .bind(id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
