pub mod analytics;
pub mod dashboard;
pub mod milestones;
pub mod notifications;
pub mod projects;
