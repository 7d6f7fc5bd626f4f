//! External system integrations for starsync.
//!
//! - [`database`] - trait seams and the adapter factory
//! - [`mysql`] - Sakila OLTP source
//! - [`postgresql`] - star-schema analytics target and watermark store
//! - [`memory`] - in-memory source and target used to drive runs in tests
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies.
//! The core only sees [`database::SourceReader`], [`database::TargetStore`]
//! and [`database::StateStorage`]:
//!
//! ```rust,no_run
//! use starsync::adapters::database::{create_source, create_target_and_state};
//! use starsync::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("starsync.toml")?;
//! let source = create_source(&config)?;
//! let (target, _state) = create_target_and_state(&config)?;
//!
//! source.test_connection().await?;
//! target.ensure_schema().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod mysql;
pub mod postgresql;
