//! Domain models and types for starsync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Key types** ([`SurrogateKey`], [`DateKey`])
//! - **The table catalogue** ([`SyncTable`])
//! - **Source rows** ([`source`]) as read from the Sakila OLTP schema
//! - **Target rows** ([`target`]) of the star-schema analytics store
//! - **Error types** ([`StarsyncError`], [`SourceError`], [`TargetError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, StarsyncError>`]:
//!
//! ```rust
//! use starsync::domain::{Result, SyncTable};
//!
//! fn parse_table(name: &str) -> Result<SyncTable> {
//!     name.parse()
//!         .map_err(starsync::domain::StarsyncError::Validation)
//! }
//!
//! assert_eq!(parse_table("film").unwrap(), SyncTable::Film);
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod source;
pub mod tables;
pub mod target;

pub use errors::{SourceError, StarsyncError, TargetError};
pub use ids::{DateKey, SurrogateKey};
pub use result::Result;
pub use tables::SyncTable;
