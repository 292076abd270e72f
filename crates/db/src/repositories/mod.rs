//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async queries that
//! accept `&PgPool` as the first argument.

pub mod milestone_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod project_type_repo;

pub use milestone_repo::MilestoneRepo;
pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;
pub use project_type_repo::ProjectTypeRepo;
