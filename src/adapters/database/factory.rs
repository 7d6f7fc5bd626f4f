//! Store factory
//!
//! This module builds the source and target adapters from configuration.

use crate::adapters::database::traits::{SourceReader, StateStorage, TargetStore};
use crate::adapters::mysql::adapter::MySqlSource;
use crate::adapters::mysql::client::MySqlClient;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::StarsyncConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the MySQL source reader
///
/// # Errors
///
/// Returns an error if the source connection string is invalid
pub fn create_source(config: &StarsyncConfig) -> Result<Arc<dyn SourceReader + Send + Sync>> {
    tracing::info!("Creating MySQL source reader");
    let client = MySqlClient::new(config.source.clone())?;

    Ok(Arc::new(MySqlSource::new(client)) as Arc<dyn SourceReader + Send + Sync>)
}

/// Create both target store and state storage from the same underlying client
///
/// Watermarks live in the analytics database, so both trait objects share
/// one connection pool.
///
/// # Returns
///
/// Returns a tuple of (TargetStore, StateStorage) trait objects
///
/// # Errors
///
/// Returns an error if the target connection string is invalid
pub fn create_target_and_state(
    config: &StarsyncConfig,
) -> Result<(
    Arc<dyn TargetStore + Send + Sync>,
    Arc<dyn StateStorage + Send + Sync>,
)> {
    tracing::info!("Creating PostgreSQL target store and state storage");
    let client = Arc::new(PostgreSQLClient::new(config.target.clone())?);
    let adapter = Arc::new(PostgreSQLAdapter::new_with_arc(client));

    Ok((
        adapter.clone() as Arc<dyn TargetStore + Send + Sync>,
        adapter as Arc<dyn StateStorage + Send + Sync>,
    ))
}
