//! Storage module for the durable catalog
//!
//! This module handles all database operations for the indexing engine:
//! - SQLite database initialization and schema management
//! - Canonical record persistence and set queries for reconciliation
//! - Indexing run history
//! - Per-indexer state (search radius)
//! - The durable fetch cache

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{CacheStore, StorageError, StorageResult, Store};

use crate::IndexError;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(IndexError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, IndexError> {
    SqliteStorage::new(path)
}
