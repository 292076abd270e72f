//! Completion-date prediction for active projects.
//!
//! A project far enough along is extrapolated linearly from its own
//! trajectory. Below [`EXTRAPOLATION_MIN_PROGRESS`] the prediction falls
//! back to the mean duration of completed projects of the same type, then to
//! the type's configured estimate, then to
//! [`DEFAULT_PROJECT_DURATION_DAYS`].

use chrono::Utc;
use serde::Serialize;

use crate::dates::{add_days, days_between, mean, round_half_up};
use crate::error::CoreError;
use crate::project::{Project, ProjectStatus, ProjectType, DEFAULT_PROJECT_DURATION_DAYS};
use crate::store::Stores;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Progress (percent) at or below which a project is not extrapolated.
pub const EXTRAPOLATION_MIN_PROGRESS: i32 = 5;

/// Confidence every prediction starts with.
pub const BASE_CONFIDENCE: i64 = 30;
/// Confidence added per completed peer project.
pub const CONFIDENCE_PER_PEER: i64 = 10;
/// Cap on the confidence contributed by peer projects.
pub const MAX_PEER_CONFIDENCE: i64 = 40;
/// Progress (percent) above which the project's own progress adds confidence.
pub const PROGRESS_CONFIDENCE_MIN: i32 = 20;
/// Cap on the confidence contributed by the project's own progress.
pub const MAX_PROGRESS_CONFIDENCE: i64 = 30;
/// Upper bound of the confidence score.
pub const MAX_CONFIDENCE: i64 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where a prediction's total duration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionBasis {
    /// Elapsed time divided by current progress.
    Trajectory,
    /// Mean duration of completed projects of the same type.
    History,
    /// The project type's configured duration.
    TypeEstimate,
    /// Neither history nor a known type; the built-in default.
    Default,
}

/// Predicted completion of one active project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionPrediction {
    pub project_id: DbId,
    pub project_name: String,
    pub project_type_id: DbId,
    pub current_progress: i32,
    pub start_date: Timestamp,
    pub estimated_end_date: Timestamp,
    pub predicted_end_date: Timestamp,
    pub predicted_total_days: i64,
    /// Predicted minus estimated end, in days; negative means ahead of
    /// schedule.
    pub days_delay: i64,
    /// Heuristic confidence, 0-100.
    pub confidence: i64,
    pub similar_projects: usize,
    pub basis: PredictionBasis,
}

// ---------------------------------------------------------------------------
// Pure computations
// ---------------------------------------------------------------------------

/// Completed projects of the same type with a recorded end date.
pub fn similar_projects<'a>(project: &Project, all_projects: &'a [Project]) -> Vec<&'a Project> {
    all_projects
        .iter()
        .filter(|p| {
            p.project_type_id == project.project_type_id
                && p.status == ProjectStatus::Completed
                && p.actual_end_date.is_some()
        })
        .collect()
}

/// Reference duration in days for a project without a usable trajectory.
pub fn reference_duration(
    project: &Project,
    similar: &[&Project],
    project_types: &[ProjectType],
) -> (f64, PredictionBasis) {
    let durations: Vec<f64> = similar
        .iter()
        .filter_map(|p| Some(days_between(p.start_date, p.actual_end_date?) as f64))
        .collect();
    if let Some(avg) = mean(&durations) {
        return (avg, PredictionBasis::History);
    }

    match project_types
        .iter()
        .find(|t| t.id == project.project_type_id)
    {
        Some(t) => (f64::from(t.estimated_duration_days), PredictionBasis::TypeEstimate),
        None => (
            f64::from(DEFAULT_PROJECT_DURATION_DAYS),
            PredictionBasis::Default,
        ),
    }
}

/// Confidence score from the number of peer projects and current progress.
pub fn prediction_confidence(similar_count: usize, progress: i32) -> i64 {
    let peers = (similar_count as i64 * CONFIDENCE_PER_PEER).min(MAX_PEER_CONFIDENCE);
    let own = if progress > PROGRESS_CONFIDENCE_MIN {
        round_half_up(f64::from(progress) / 3.0).min(MAX_PROGRESS_CONFIDENCE)
    } else {
        0
    };
    (BASE_CONFIDENCE + peers + own).min(MAX_CONFIDENCE)
}

/// Predict one project's completion as of `now`.
pub fn predict_one(
    project: &Project,
    all_projects: &[Project],
    project_types: &[ProjectType],
    now: Timestamp,
) -> CompletionPrediction {
    let similar = similar_projects(project, all_projects);
    let progress = project.progress_percentage;

    let (predicted_total_days, basis) = if progress > EXTRAPOLATION_MIN_PROGRESS {
        let days_elapsed = days_between(project.start_date, now) as f64;
        (
            round_half_up(days_elapsed / (f64::from(progress) / 100.0)),
            PredictionBasis::Trajectory,
        )
    } else {
        let (average, basis) = reference_duration(project, &similar, project_types);
        (round_half_up(average), basis)
    };

    let predicted_end_date = add_days(project.start_date, predicted_total_days);

    CompletionPrediction {
        project_id: project.id,
        project_name: project.name.clone(),
        project_type_id: project.project_type_id,
        current_progress: progress,
        start_date: project.start_date,
        estimated_end_date: project.estimated_end_date,
        predicted_end_date,
        predicted_total_days,
        days_delay: days_between(project.estimated_end_date, predicted_end_date),
        confidence: prediction_confidence(similar.len(), progress),
        similar_projects: similar.len(),
        basis,
    }
}

/// Predict every project in `active`, most delayed first.
pub fn predict_completion(
    active: &[Project],
    all_projects: &[Project],
    project_types: &[ProjectType],
    now: Timestamp,
) -> Vec<CompletionPrediction> {
    let mut predictions: Vec<CompletionPrediction> = active
        .iter()
        .map(|p| predict_one(p, all_projects, project_types, now))
        .collect();
    predictions.sort_by(|a, b| b.days_delay.cmp(&a.days_delay));
    predictions
}

// ---------------------------------------------------------------------------
// Predictor
// ---------------------------------------------------------------------------

/// Store-backed entry point for completion predictions.
pub struct CompletionPredictor {
    stores: Stores,
}

impl CompletionPredictor {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn predict_project_completion(
        &self,
    ) -> Result<Vec<CompletionPrediction>, CoreError> {
        let active = self.stores.projects.get_active_projects().await?;
        let all_projects = self.stores.projects.get_all_projects().await?;
        let project_types = self.stores.project_types.get_all_project_types().await?;
        Ok(predict_completion(
            &active,
            &all_projects,
            &project_types,
            Utc::now(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
