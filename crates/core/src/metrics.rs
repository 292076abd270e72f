//! Reporting rollups over the full project and milestone corpus.
//!
//! The free functions are pure and take the data plus a clock;
//! [`MetricsAggregator`] fetches the data from the stores and calls them.

use chrono::Utc;
use serde::Serialize;

use crate::dates::{days_between, mean, percentage, round_half_up, trailing_months};
use crate::error::CoreError;
use crate::milestone::Milestone;
use crate::project::{Project, ProjectStatus, ProjectType};
use crate::store::Stores;
use crate::types::{DbId, Timestamp};

/// Number of calendar months covered by the velocity chart.
pub const VELOCITY_MONTHS: usize = 6;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Throughput for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VelocityPoint {
    /// Short label, e.g. `"Oct 2026"`.
    pub month: String,
    pub month_start: Timestamp,
    pub milestones_completed: usize,
    pub projects_completed: usize,
    /// Mean start-to-completion days of the month's completed milestones
    /// that have a start date; 0 when there are none.
    pub average_days_to_complete: i64,
}

/// Duration and completion statistics for one project type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTypeMetrics {
    pub project_type_id: DbId,
    pub project_type_name: String,
    pub project_count: usize,
    pub average_duration_days: i64,
    /// Percentage of the type's projects with status `completed`.
    pub completion_rate: i64,
    pub average_progress: i64,
}

/// Dashboard-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub delayed_projects: usize,
    pub total_milestones: usize,
    pub completed_milestones: usize,
    pub overdue_milestones: usize,
    pub average_progress: i64,
}

// ---------------------------------------------------------------------------
// Pure computations
// ---------------------------------------------------------------------------

/// Monthly throughput for the [`VELOCITY_MONTHS`] months ending with the
/// month containing `now`, oldest first.
pub fn team_velocity(
    projects: &[Project],
    milestones: &[Milestone],
    now: Timestamp,
) -> Vec<VelocityPoint> {
    trailing_months(now, VELOCITY_MONTHS)
        .into_iter()
        .map(|window| {
            let completed: Vec<&Milestone> = milestones
                .iter()
                .filter(|m| m.completed_date.is_some_and(|d| window.contains(d)))
                .collect();

            let durations: Vec<f64> = completed
                .iter()
                .filter_map(|m| Some(days_between(m.start_date?, m.completed_date?) as f64))
                .collect();

            let projects_completed = projects
                .iter()
                .filter(|p| p.actual_end_date.is_some_and(|d| window.contains(d)))
                .count();

            VelocityPoint {
                month: window.label(),
                month_start: window.start,
                milestones_completed: completed.len(),
                projects_completed,
                average_days_to_complete: mean(&durations).map(round_half_up).unwrap_or(0),
            }
        })
        .collect()
}

/// Per-type statistics, for types that have at least one project, sorted by
/// project count (largest first).
pub fn project_type_metrics(
    project_types: &[ProjectType],
    projects: &[Project],
) -> Vec<ProjectTypeMetrics> {
    let mut entries: Vec<ProjectTypeMetrics> = project_types
        .iter()
        .filter_map(|project_type| {
            let of_type: Vec<&Project> = projects
                .iter()
                .filter(|p| p.project_type_id == project_type.id)
                .collect();
            if of_type.is_empty() {
                return None;
            }

            let durations: Vec<f64> = of_type
                .iter()
                .filter_map(|p| Some(days_between(p.start_date, p.actual_end_date?) as f64))
                .collect();
            let average_duration_days = mean(&durations)
                .map(round_half_up)
                .unwrap_or(i64::from(project_type.estimated_duration_days));

            let completed = of_type
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed)
                .count();
            let progress: Vec<f64> = of_type
                .iter()
                .map(|p| f64::from(p.progress_percentage))
                .collect();

            Some(ProjectTypeMetrics {
                project_type_id: project_type.id,
                project_type_name: project_type.name.clone(),
                project_count: of_type.len(),
                average_duration_days,
                completion_rate: percentage(completed as i64, of_type.len() as i64),
                average_progress: mean(&progress).map(round_half_up).unwrap_or(0),
            })
        })
        .collect();

    // Stable sort keeps the store's type order among equal counts.
    entries.sort_by(|a, b| b.project_count.cmp(&a.project_count));
    entries
}

/// Dashboard counters as of `now`.
pub fn dashboard_stats(
    projects: &[Project],
    milestones: &[Milestone],
    now: Timestamp,
) -> DashboardStats {
    let count_status =
        |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();
    let progress: Vec<f64> = projects
        .iter()
        .map(|p| f64::from(p.progress_percentage))
        .collect();

    DashboardStats {
        total_projects: projects.len(),
        active_projects: count_status(ProjectStatus::InProgress),
        completed_projects: count_status(ProjectStatus::Completed),
        delayed_projects: projects
            .iter()
            .filter(|p| p.status.is_active() && p.estimated_end_date < now)
            .count(),
        total_milestones: milestones.len(),
        completed_milestones: milestones
            .iter()
            .filter(|m| m.status.is_completed())
            .count(),
        overdue_milestones: milestones.iter().filter(|m| m.is_overdue(now)).count(),
        average_progress: mean(&progress).map(round_half_up).unwrap_or(0),
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Store-backed entry point for the reporting rollups.
pub struct MetricsAggregator {
    stores: Stores,
}

impl MetricsAggregator {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn calculate_team_velocity(&self) -> Result<Vec<VelocityPoint>, CoreError> {
        let projects = self.stores.projects.get_all_projects().await?;
        let milestones = self.stores.milestones.get_all_milestones().await?;
        Ok(team_velocity(&projects, &milestones, Utc::now()))
    }

    pub async fn calculate_project_type_metrics(
        &self,
    ) -> Result<Vec<ProjectTypeMetrics>, CoreError> {
        let project_types = self.stores.project_types.get_all_project_types().await?;
        let projects = self.stores.projects.get_all_projects().await?;
        Ok(project_type_metrics(&project_types, &projects))
    }

    pub async fn calculate_dashboard_stats(&self) -> Result<DashboardStats, CoreError> {
        let projects = self.stores.projects.get_all_projects().await?;
        let milestones = self.stores.milestones.get_all_milestones().await?;
        Ok(dashboard_stats(&projects, &milestones, Utc::now()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::memory::InMemoryStore;
    use crate::milestone::MilestoneStatus;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn project(id: DbId, type_id: DbId, status: ProjectStatus, progress: i32) -> Project {
        Project {
            id,
            name: format!("Project {id}"),
            project_type_id: type_id,
            status,
            location: None,
            client_name: None,
            start_date: at(2026, 6, 1),
            estimated_end_date: at(2026, 12, 1),
            actual_end_date: None,
            progress_percentage: progress,
        }
    }

    fn milestone(id: DbId, status: MilestoneStatus) -> Milestone {
        Milestone {
            id,
            project_id: 1,
            name: format!("Milestone {id}"),
            status,
            start_date: None,
            due_date: None,
            completed_date: None,
            weight: 1,
            order_index: 0,
        }
    }

    fn project_type(id: DbId, name: &str, days: i32) -> ProjectType {
        ProjectType {
            id,
            name: name.into(),
            estimated_duration_days: days,
        }
    }

    // -- team_velocity --

    #[test]
    fn velocity_always_has_six_months_oldest_first() {
        let points = team_velocity(&[], &[], now());
        assert_eq!(points.len(), VELOCITY_MONTHS);
        assert_eq!(points[0].month, "May 2026");
        assert_eq!(points[5].month, "Oct 2026");
        assert!(points.iter().all(|p| p.milestones_completed == 0
            && p.projects_completed == 0
            && p.average_days_to_complete == 0));
    }

    #[test]
    fn velocity_buckets_completions_by_month() {
        let mut a = milestone(1, MilestoneStatus::Completed);
        a.start_date = Some(at(2026, 9, 1));
        a.completed_date = Some(at(2026, 9, 11));
        let mut b = milestone(2, MilestoneStatus::Completed);
        b.start_date = Some(at(2026, 9, 1));
        b.completed_date = Some(at(2026, 9, 21));
        let mut no_start = milestone(3, MilestoneStatus::Completed);
        no_start.completed_date = Some(at(2026, 9, 30));
        let mut this_month = milestone(4, MilestoneStatus::Completed);
        this_month.completed_date = Some(at(2026, 10, 2));
        let mut too_old = milestone(5, MilestoneStatus::Completed);
        too_old.completed_date = Some(at(2026, 4, 30));

        let mut finished = project(1, 1, ProjectStatus::Completed, 100);
        finished.actual_end_date = Some(at(2026, 10, 1));

        let points = team_velocity(&[finished], &[a, b, no_start, this_month, too_old], now());
        let september = &points[4];
        assert_eq!(september.month, "Sep 2026");
        assert_eq!(september.milestones_completed, 3);
        assert_eq!(september.average_days_to_complete, 15);

        let october = &points[5];
        assert_eq!(october.milestones_completed, 1);
        assert_eq!(october.projects_completed, 1);
        assert_eq!(october.average_days_to_complete, 0);

        let total: usize = points.iter().map(|p| p.milestones_completed).sum();
        assert_eq!(total, 4);
    }

    // -- project_type_metrics --

    #[test]
    fn type_metrics_omit_empty_types_and_sort_by_count() {
        let types = vec![
            project_type(1, "Residential", 45),
            project_type(2, "Commercial", 120),
            project_type(3, "Battery retrofit", 20),
        ];
        let projects = vec![
            project(1, 1, ProjectStatus::InProgress, 40),
            project(2, 2, ProjectStatus::Planning, 0),
            project(3, 2, ProjectStatus::InProgress, 25),
        ];

        let metrics = project_type_metrics(&types, &projects);
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].project_type_name, "Commercial");
        assert_eq!(metrics[0].project_count, 2);
        assert_eq!(metrics[1].project_type_name, "Residential");
        assert!(metrics.iter().all(|m| m.project_type_id != 3));
    }

    #[test]
    fn type_metrics_use_actual_durations_when_available() {
        let types = vec![project_type(1, "Residential", 45)];
        let mut done = project(1, 1, ProjectStatus::Completed, 100);
        done.start_date = at(2026, 1, 1);
        done.actual_end_date = Some(at(2026, 1, 31));
        let mut done_too = project(2, 1, ProjectStatus::Completed, 100);
        done_too.start_date = at(2026, 2, 1);
        done_too.actual_end_date = Some(at(2026, 3, 13));
        let running = project(3, 1, ProjectStatus::InProgress, 33);

        let metrics = project_type_metrics(&types, &[done, done_too, running]);
        let entry = &metrics[0];
        assert_eq!(entry.average_duration_days, 35);
        assert_eq!(entry.completion_rate, 67);
        assert_eq!(entry.average_progress, 78);
    }

    #[test]
    fn type_metrics_fall_back_to_estimate() {
        let types = vec![project_type(1, "Residential", 45)];
        let metrics = project_type_metrics(&types, &[project(1, 1, ProjectStatus::Planning, 0)]);
        assert_eq!(metrics[0].average_duration_days, 45);
        assert_eq!(metrics[0].completion_rate, 0);
        assert_eq!(metrics[0].average_progress, 0);
    }

    #[test]
    fn type_metric_rates_stay_within_bounds() {
        let types = vec![project_type(1, "Residential", 45)];
        let projects: Vec<Project> = (1..=7)
            .map(|id| {
                let status = if id % 2 == 0 {
                    ProjectStatus::Completed
                } else {
                    ProjectStatus::InProgress
                };
                project(id, 1, status, (id as i32 * 17) % 101)
            })
            .collect();
        for m in project_type_metrics(&types, &projects) {
            assert!((0..=100).contains(&m.completion_rate));
            assert!((0..=100).contains(&m.average_progress));
        }
    }

    // -- dashboard_stats --

    #[test]
    fn dashboard_stats_on_empty_corpus() {
        assert_eq!(dashboard_stats(&[], &[], now()), DashboardStats::default());
    }

    #[test]
    fn dashboard_stats_counts_delays_and_overdues() {
        let mut late = project(1, 1, ProjectStatus::InProgress, 50);
        late.estimated_end_date = now() - Duration::days(3);
        let mut late_but_done = project(2, 1, ProjectStatus::Completed, 100);
        late_but_done.estimated_end_date = now() - Duration::days(3);
        let mut late_on_hold = project(3, 1, ProjectStatus::OnHold, 20);
        late_on_hold.estimated_end_date = now() - Duration::days(1);
        let mut late_cancelled = project(4, 1, ProjectStatus::Cancelled, 0);
        late_cancelled.estimated_end_date = now() - Duration::days(1);
        let on_time = project(5, 1, ProjectStatus::Planning, 5);

        let mut overdue_pending = milestone(1, MilestoneStatus::Pending);
        overdue_pending.due_date = Some(now() - Duration::days(1));
        let mut flagged = milestone(2, MilestoneStatus::Overdue);
        flagged.due_date = Some(now() - Duration::days(9));
        let mut completed_late = milestone(3, MilestoneStatus::Completed);
        completed_late.due_date = Some(now() - Duration::days(9));
        let mut flagged_not_due = milestone(4, MilestoneStatus::Overdue);
        flagged_not_due.due_date = Some(now() + Duration::days(2));

        let stats = dashboard_stats(
            &[late, late_but_done, late_on_hold, late_cancelled, on_time],
            &[overdue_pending, flagged, completed_late, flagged_not_due],
            now(),
        );

        assert_eq!(stats.total_projects, 5);
        assert_eq!(stats.active_projects, 1);
        assert_eq!(stats.completed_projects, 1);
        assert_eq!(stats.delayed_projects, 2);
        assert_eq!(stats.total_milestones, 4);
        assert_eq!(stats.completed_milestones, 1);
        assert_eq!(stats.overdue_milestones, 2);
        assert_eq!(stats.average_progress, 35);
        assert!(stats.total_projects >= stats.active_projects + stats.completed_projects);
        assert!(stats.total_milestones >= stats.completed_milestones);
    }

    // -- aggregator --

    #[tokio::test]
    async fn aggregator_reads_from_stores() {
        let store = Arc::new(InMemoryStore::new());
        store.put_project_type(project_type(1, "Residential", 45)).await;
        store.put_project(project(1, 1, ProjectStatus::InProgress, 60)).await;
        store.put_milestone(milestone(1, MilestoneStatus::Completed)).await;

        let aggregator = MetricsAggregator::new(Stores::from_shared(store));
        let stats = aggregator.calculate_dashboard_stats().await.unwrap();
        assert_eq!(stats.total_projects, 1);
        assert_eq!(stats.completed_milestones, 1);
        assert_eq!(stats.average_progress, 60);

        assert_eq!(aggregator.calculate_team_velocity().await.unwrap().len(), 6);
        assert_eq!(aggregator.calculate_project_type_metrics().await.unwrap().len(), 1);
    }
}
