//! Store abstraction layer
//!
//! This module provides the trait seams between the synchronization core
//! and the concrete stores (MySQL/PostgreSQL, or in-memory for tests).

pub mod factory;
pub mod traits;

pub use factory::{create_source, create_target_and_state};
pub use traits::{BatchOutcome, SourceReader, StateStorage, TargetStore};
