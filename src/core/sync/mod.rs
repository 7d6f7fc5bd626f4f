//! Dimensional synchronization
//!
//! - [`dimensions`] - source entities → dimension rows
//! - [`facts`] - source events → fact rows, junctions → bridge pairs
//! - [`derive`] - date keys and rental durations
//! - [`coordinator`] - per-table steps, commits and watermarks
//! - [`summary`] - run and step reporting

pub mod coordinator;
pub mod derive;
pub mod dimensions;
pub mod facts;
pub mod summary;

pub use coordinator::SyncCoordinator;
pub use summary::{StepReport, StepStatus, SyncMode, SyncSummary};
