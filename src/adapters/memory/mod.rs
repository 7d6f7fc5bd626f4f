//! In-memory source and target stores
//!
//! These implement the same traits as the MySQL and PostgreSQL adapters and
//! are used to drive whole runs in tests without a database.

pub mod source;
pub mod target;

pub use source::{InMemorySource, SourceData};
pub use target::InMemoryTarget;
