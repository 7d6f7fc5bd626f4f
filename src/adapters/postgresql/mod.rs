//! PostgreSQL analytics store
//!
//! This module provides the star-schema target and the `sync_state`
//! watermark store, both backed by one pooled client.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::PostgreSQLWatermark;
