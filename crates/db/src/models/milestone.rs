//! Milestone row model.

use helios_core::error::CoreError;
use helios_core::milestone::Milestone;
use helios_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `milestones` table.
#[derive(Debug, Clone, FromRow)]
pub struct MilestoneRow {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub status: String,
    pub start_date: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub completed_date: Option<Timestamp>,
    pub weight: i32,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<MilestoneRow> for Milestone {
    type Error = CoreError;

    fn try_from(row: MilestoneRow) -> Result<Self, Self::Error> {
        Ok(Milestone {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            status: row.status.parse()?,
            start_date: row.start_date,
            due_date: row.due_date,
            completed_date: row.completed_date,
            weight: row.weight,
            order_index: row.order_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use helios_core::milestone::MilestoneStatus;

    use super::*;

    fn row(status: &str) -> MilestoneRow {
        let now = Utc::now();
        MilestoneRow {
            id: 11,
            project_id: 3,
            name: "Utility interconnection".into(),
            status: status.into(),
            start_date: None,
            due_date: Some(now),
            completed_date: None,
            weight: 2,
            order_index: 4,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn converts_known_status() {
        let milestone = Milestone::try_from(row("overdue")).unwrap();
        assert_eq!(milestone.status, MilestoneStatus::Overdue);
        assert_eq!(milestone.weight, 2);
        assert_eq!(milestone.order_index, 4);
    }

    #[test]
    fn rejects_unknown_status() {
        assert_matches!(Milestone::try_from(row("skipped")), Err(CoreError::Validation(_)));
    }
}
