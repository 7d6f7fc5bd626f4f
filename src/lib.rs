// starsync - Sakila to star-schema synchronizer
// Copyright (c) 2025 Starsync Contributors
// Licensed under the MIT License

//! # starsync - Sakila to star-schema synchronization
//!
//! starsync keeps a PostgreSQL analytics store, laid out as a star schema,
//! in step with a MySQL Sakila rental database.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Initializing** the analytics schema and the `dim_date` calendar
//! - **Full loads** that seed every dimension, bridge and fact table
//! - **Incremental syncs** that upsert rows changed since each table's watermark
//! - **Reconciliation** of row counts and payment totals between both sides
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Synchronization, key resolution, watermarks, reconciliation
//! - [`adapters`] - MySQL source, PostgreSQL target and in-memory stores
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use starsync::config::load_config;
//! use starsync::core::sync::SyncCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("starsync.toml")?;
//!     let coordinator = SyncCoordinator::from_config(config)?;
//!
//!     coordinator.initialize().await?;
//!     let summary = coordinator.incremental_sync().await?;
//!     coordinator.close().await?;
//!
//!     println!(
//!         "Inserted {}, updated {}",
//!         summary.total_inserted(),
//!         summary.total_updated()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], whose error type is
//! [`domain::StarsyncError`]. A failed table step does not surface as an
//! error: it is recorded in the run's [`core::sync::SyncSummary`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
