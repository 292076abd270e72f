//! Row structs for the Helios tables.
//!
//! Each submodule holds a `FromRow` struct matching the table's columns.
//! Rows carrying status text convert into the core domain types through
//! `TryFrom`, rejecting unknown status values.

pub mod milestone;
pub mod notification;
pub mod project;
pub mod project_type;
