//! Helios domain core.
//!
//! Holds the project/milestone domain types, the store and notifier seams,
//! and the progress, metrics and prediction engines. The crate has no
//! database dependencies; storage is injected through the traits in
//! [`store`].

pub mod dates;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod milestone;
pub mod prediction;
pub mod progress;
pub mod project;
pub mod store;
pub mod types;
