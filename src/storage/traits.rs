//! Storage traits and error types
//!
//! This module defines the trait interfaces for the durable record store and
//! the durable fetch cache, plus associated error types.

use crate::content::{Coordinates, IndexedRecord};
use crate::indexer::IndexingRun;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the durable record store
///
/// Implementations must guarantee read-your-writes consistency within one
/// run's sequential operations; cross-run isolation is the scheduler's job.
pub trait Store {
    // ===== Run Management =====

    /// Creates a new indexing run in the `running` state
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, platform: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<IndexingRun>;

    /// Persists the current state of a run (status, counters, timestamps)
    fn update_run(&mut self, run: &IndexingRun) -> StorageResult<()>;

    /// Gets the most recent runs across all platforms, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<IndexingRun>>;

    /// Gets the most recent runs for one platform, newest first
    fn runs_for_platform(&self, platform: &str, limit: usize) -> StorageResult<Vec<IndexingRun>>;

    // ===== Record Management =====

    /// Finds a record by its platform-scoped identifier
    fn find_record(
        &self,
        platform: &str,
        external_id: &str,
    ) -> StorageResult<Option<IndexedRecord>>;

    /// Inserts or updates a record, keyed on `(source_platform, external_id)`
    fn upsert_record(&mut self, record: &IndexedRecord) -> StorageResult<()>;

    /// Deletes a record; deleting a missing record is not an error
    fn delete_record(&mut self, platform: &str, external_id: &str) -> StorageResult<()>;

    /// Gets the full set of external IDs currently stored for a platform
    fn external_ids_for(&self, platform: &str) -> StorageResult<HashSet<String>>;

    /// Gets the coordinate pairs of all spatial records for a platform
    fn coordinates_for(&self, platform: &str) -> StorageResult<HashSet<Coordinates>>;

    /// Counts records last indexed within `[start, end)`
    fn count_indexed_between(
        &self,
        platform: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<u64>;

    /// Counts all records stored for a platform
    fn count_records(&self, platform: &str) -> StorageResult<u64>;

    // ===== Indexer State =====

    /// Loads the persisted search radius for an indexer, if any
    fn load_search_radius(&self, indexer: &str) -> StorageResult<Option<u32>>;

    /// Persists the search radius for an indexer
    fn save_search_radius(&mut self, indexer: &str, radius: u32) -> StorageResult<()>;
}

/// Trait for the durable fetch cache
///
/// Cache failures must never abort indexing; callers wrap every operation
/// in a best-effort combinator.
pub trait CacheStore {
    /// Reads a cached value; expired entries read as misses
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value with a time-to-live
    fn write(&mut self, key: &str, value: &str, ttl: Duration) -> StorageResult<()>;

    /// Deletes a single cache entry
    fn delete(&mut self, key: &str) -> StorageResult<()>;

    /// Deletes every cache entry whose key starts with the given prefix
    fn delete_prefix(&mut self, prefix: &str) -> StorageResult<()>;
}
