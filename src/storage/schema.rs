//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Metaindex catalog.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track indexing runs
CREATE TABLE IF NOT EXISTS indexing_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    platform TEXT NOT NULL,
    status TEXT NOT NULL,
    items_processed INTEGER NOT NULL DEFAULT 0,
    items_failed INTEGER NOT NULL DEFAULT 0,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    error_message TEXT,
    config_hash TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_runs_platform ON indexing_runs(platform);

-- Canonical catalog of externally-hosted content
CREATE TABLE IF NOT EXISTS indexed_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_platform TEXT NOT NULL,
    external_id TEXT NOT NULL,
    content_type TEXT NOT NULL,
    title TEXT,
    description TEXT,
    author TEXT,
    coord_x INTEGER,
    coord_y INTEGER,
    metadata TEXT NOT NULL DEFAULT '{}',
    last_indexed_at TEXT NOT NULL,
    UNIQUE(source_platform, external_id)
);

CREATE INDEX IF NOT EXISTS idx_records_platform ON indexed_records(source_platform);
CREATE INDEX IF NOT EXISTS idx_records_indexed_at ON indexed_records(source_platform, last_indexed_at);
CREATE INDEX IF NOT EXISTS idx_records_coords ON indexed_records(source_platform, coord_x, coord_y);

-- Per-indexer persistent state (currently the search radius)
CREATE TABLE IF NOT EXISTS indexer_state (
    indexer TEXT PRIMARY KEY,
    search_radius INTEGER NOT NULL
);

-- Durable fetch cache with per-entry expiry
CREATE TABLE IF NOT EXISTS fetch_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cache_expires ON fetch_cache(expires_at);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Initialize twice
        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        // Should succeed the second time too
        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let tables = vec![
            "indexing_runs",
            "indexed_records",
            "indexer_state",
            "fetch_cache",
        ];

        for table in tables {
            let count: Result<i64, _> = conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{}'",
                    table
                ),
                [],
                |row| row.get(0),
            );
            assert!(count.is_ok());
            assert_eq!(count.unwrap(), 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_record_uniqueness_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let insert = "INSERT INTO indexed_records
            (source_platform, external_id, content_type, last_indexed_at)
            VALUES ('p', 'x', 'scene', '2026-01-01T00:00:00+00:00')";

        conn.execute(insert, []).unwrap();
        let second = conn.execute(insert, []);
        assert!(second.is_err(), "duplicate (platform, external_id) must fail");
    }
}
