//! Core business logic for starsync.
//!
//! # Modules
//!
//! - [`keys`] - Natural → surrogate key resolution
//! - [`state`] - Per-table watermarks for incremental runs
//! - [`sync`] - Dimension, fact and bridge synchronization
//! - [`calendar`] - Calendar dimension seeding
//! - [`verification`] - Source/target reconciliation
//!
//! # Sync Workflow
//!
//! 1. **Connect**: Test the source and target connections
//! 2. **Dimensions**: Film, actor, category, store and customer batches
//! 3. **Resolve Keys**: Load natural → surrogate keys from the target
//! 4. **Bridges**: Film/actor and film/category pairs (full load only)
//! 5. **Facts**: Rental and payment batches with derived attributes
//! 6. **Checkpoint**: Advance each table's watermark after its commit
//! 7. **Report**: Generate the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use starsync::config::load_config;
//! use starsync::core::sync::SyncCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("starsync.toml")?;
//! let coordinator = SyncCoordinator::from_config(config)?;
//!
//! let summary = coordinator.incremental_sync().await?;
//!
//! println!("Inserted: {}", summary.total_inserted());
//! println!("Updated: {}", summary.total_updated());
//! println!("Successful: {}", summary.is_successful());
//! coordinator.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod keys;
pub mod state;
pub mod sync;
pub mod verification;
