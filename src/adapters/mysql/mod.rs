//! MySQL OLTP source
//!
//! Read-only access to the Sakila schema through `mysql_async`.

pub mod adapter;
pub mod client;
pub mod values;

pub use adapter::MySqlSource;
pub use client::MySqlClient;
