//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store and
//! CacheStore traits.

use crate::content::{Coordinates, IndexedRecord};
use crate::indexer::{IndexingRun, RunStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CacheStore, StorageError, StorageResult, Store};
use crate::IndexError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// SQLite storage backend for the catalog, run history, indexer state, and
/// fetch cache
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(IndexError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(path).map_err(StorageError::Sqlite)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )
        .map_err(StorageError::Sqlite)?;

        initialize_schema(&conn).map_err(StorageError::Sqlite)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory().map_err(StorageError::Sqlite)?;
        initialize_schema(&conn).map_err(StorageError::Sqlite)?;
        Ok(Self { conn })
    }

    fn map_run(row: &Row<'_>) -> rusqlite::Result<IndexingRun> {
        Ok(IndexingRun {
            id: row.get(0)?,
            platform: row.get(1)?,
            status: RunStatus::from_db_string(&row.get::<_, String>(2)?)
                .unwrap_or(RunStatus::Failed),
            items_processed: row.get::<_, i64>(3)?.max(0) as u64,
            items_failed: row.get::<_, i64>(4)?.max(0) as u64,
            started_at: row.get(5)?,
            ended_at: row.get(6)?,
            error_message: row.get(7)?,
            config_hash: row.get(8)?,
        })
    }

    fn map_record(row: &Row<'_>) -> rusqlite::Result<IndexedRecord> {
        let coord_x: Option<i32> = row.get(6)?;
        let coord_y: Option<i32> = row.get(7)?;
        let coordinates = match (coord_x, coord_y) {
            (Some(x), Some(y)) => Some(Coordinates::new(x, y)),
            _ => None,
        };

        let metadata_raw: String = row.get(8)?;
        let metadata = serde_json::from_str(&metadata_raw)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));

        Ok(IndexedRecord {
            source_platform: row.get(0)?,
            external_id: row.get(1)?,
            content_type: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            author: row.get(5)?,
            coordinates,
            metadata,
            last_indexed_at: row.get(9)?,
        })
    }
}

const RUN_COLUMNS: &str = "id, platform, status, items_processed, items_failed, \
     started_at, ended_at, error_message, config_hash";

const RECORD_COLUMNS: &str = "source_platform, external_id, content_type, title, description, \
     author, coord_x, coord_y, metadata, last_indexed_at";

impl Store for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, platform: &str, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO indexing_runs (platform, status, started_at, config_hash)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                platform,
                RunStatus::Running.to_db_string(),
                Utc::now(),
                config_hash
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<IndexingRun> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM indexing_runs WHERE id = ?1",
            RUN_COLUMNS
        ))?;

        stmt.query_row(params![run_id], Self::map_run)
            .map_err(|_| StorageError::RunNotFound(run_id))
    }

    fn update_run(&mut self, run: &IndexingRun) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE indexing_runs
             SET status = ?1, items_processed = ?2, items_failed = ?3,
                 ended_at = ?4, error_message = ?5
             WHERE id = ?6",
            params![
                run.status.to_db_string(),
                run.items_processed as i64,
                run.items_failed as i64,
                run.ended_at,
                run.error_message,
                run.id
            ],
        )?;
        Ok(())
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<IndexingRun>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM indexing_runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![limit as i64], Self::map_run)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(runs)
    }

    fn runs_for_platform(&self, platform: &str, limit: usize) -> StorageResult<Vec<IndexingRun>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM indexing_runs WHERE platform = ?1 ORDER BY id DESC LIMIT ?2",
            RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![platform, limit as i64], Self::map_run)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(runs)
    }

    // ===== Record Management =====

    fn find_record(
        &self,
        platform: &str,
        external_id: &str,
    ) -> StorageResult<Option<IndexedRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM indexed_records WHERE source_platform = ?1 AND external_id = ?2",
            RECORD_COLUMNS
        ))?;

        let record = stmt
            .query_row(params![platform, external_id], Self::map_record)
            .optional()?;

        Ok(record)
    }

    fn upsert_record(&mut self, record: &IndexedRecord) -> StorageResult<()> {
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO indexed_records
                 (source_platform, external_id, content_type, title, description,
                  author, coord_x, coord_y, metadata, last_indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(source_platform, external_id) DO UPDATE SET
                 content_type = excluded.content_type,
                 title = excluded.title,
                 description = excluded.description,
                 author = excluded.author,
                 coord_x = excluded.coord_x,
                 coord_y = excluded.coord_y,
                 metadata = excluded.metadata,
                 last_indexed_at = excluded.last_indexed_at",
            params![
                record.source_platform,
                record.external_id,
                record.content_type,
                record.title,
                record.description,
                record.author,
                record.coordinates.map(|c| c.x),
                record.coordinates.map(|c| c.y),
                metadata,
                record.last_indexed_at,
            ],
        )?;

        Ok(())
    }

    fn delete_record(&mut self, platform: &str, external_id: &str) -> StorageResult<()> {
        self.conn.execute(
            "DELETE FROM indexed_records WHERE source_platform = ?1 AND external_id = ?2",
            params![platform, external_id],
        )?;
        Ok(())
    }

    fn external_ids_for(&self, platform: &str) -> StorageResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT external_id FROM indexed_records WHERE source_platform = ?1")?;

        let ids = stmt
            .query_map(params![platform], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;

        Ok(ids)
    }

    fn coordinates_for(&self, platform: &str) -> StorageResult<HashSet<Coordinates>> {
        let mut stmt = self.conn.prepare(
            "SELECT coord_x, coord_y FROM indexed_records
             WHERE source_platform = ?1 AND coord_x IS NOT NULL AND coord_y IS NOT NULL",
        )?;

        let coords = stmt
            .query_map(params![platform], |row| {
                Ok(Coordinates::new(row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<HashSet<_>>>()?;

        Ok(coords)
    }

    fn count_indexed_between(
        &self,
        platform: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM indexed_records
             WHERE source_platform = ?1 AND last_indexed_at >= ?2 AND last_indexed_at < ?3",
            params![platform, start, end],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u64)
    }

    fn count_records(&self, platform: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM indexed_records WHERE source_platform = ?1",
            params![platform],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u64)
    }

    // ===== Indexer State =====

    fn load_search_radius(&self, indexer: &str) -> StorageResult<Option<u32>> {
        let radius: Option<i64> = self
            .conn
            .query_row(
                "SELECT search_radius FROM indexer_state WHERE indexer = ?1",
                params![indexer],
                |row| row.get(0),
            )
            .optional()?;

        Ok(radius.map(|r| r.max(0) as u32))
    }

    fn save_search_radius(&mut self, indexer: &str, radius: u32) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO indexer_state (indexer, search_radius) VALUES (?1, ?2)
             ON CONFLICT(indexer) DO UPDATE SET search_radius = excluded.search_radius",
            params![indexer, radius as i64],
        )?;
        Ok(())
    }
}

impl CacheStore for SqliteStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let entry: Option<(String, DateTime<Utc>)> = self
            .conn
            .query_row(
                "SELECT value, expires_at FROM fetch_cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match entry {
            Some((value, expires_at)) if expires_at > Utc::now() => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    fn write(&mut self, key: &str, value: &str, ttl: Duration) -> StorageResult<()> {
        let now = Utc::now();

        // Writes double as the expiry sweep
        self.conn.execute(
            "DELETE FROM fetch_cache WHERE expires_at <= ?1",
            params![now],
        )?;

        let expires_at = now + chrono::Duration::seconds(ttl.as_secs() as i64);
        self.conn.execute(
            "INSERT OR REPLACE INTO fetch_cache (key, value, expires_at) VALUES (?1, ?2, ?3)",
            params![key, value, expires_at],
        )?;

        Ok(())
    }

    fn delete(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM fetch_cache WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn delete_prefix(&mut self, prefix: &str) -> StorageResult<()> {
        self.conn.execute(
            "DELETE FROM fetch_cache WHERE key LIKE ?1",
            params![format!("{}%", prefix)],
        )?;
        Ok(())
    }
}
