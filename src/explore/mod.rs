//! Search-space exploration
//!
//! This module enumerates the candidates an indexing run will visit. Two
//! strategies exist as a closed set: coordinate-grid exploration for spatial
//! platforms (expanding concentric rings, minus already-indexed cells) and
//! sitemap crawling for listing-based platforms.

pub mod quota;
pub mod radius;
pub mod spiral;

pub use quota::{daily_limit_reached, local_day_bounds};
pub use radius::{
    current_search_radius, expand_search_radius, DEFAULT_SEARCH_RADIUS, MAX_SEARCH_RADIUS,
    RADIUS_STEP,
};
pub use spiral::spiral_coordinates;

use crate::content::Coordinates;
use crate::storage::{StorageResult, Store};
use chrono::{DateTime, Local};

/// How a platform's candidates are discovered
///
/// Selected by platform identifier at orchestrator start; deliberately a
/// closed set of tagged variants rather than an open trait hierarchy.
#[derive(Debug, Clone)]
pub enum ExplorationStrategy {
    /// Enumerate a 2D coordinate grid in expanding rings around a center
    CoordinateGrid {
        center: Coordinates,
        scenes_url: String,
    },

    /// Crawl the platform's published sitemap listing
    SitemapListing { sitemap_url: String },
}

impl ExplorationStrategy {
    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CoordinateGrid { .. } => "coordinates",
            Self::SitemapListing { .. } => "sitemap",
        }
    }
}

/// Generates the next batch of unexplored coordinates for a platform
///
/// Composes the quota gate, the persisted radius, ring enumeration, and
/// exclusion of already-indexed cells:
/// - returns an empty list when the daily quota is already reached
/// - excludes any coordinate pair already present on a stored record,
///   consulting the live store so freshly indexed cells within the same
///   run are never revisited
/// - truncates the remaining candidates at `limit`
///
/// # Arguments
///
/// * `store` - Live record store (exclusion set + radius state)
/// * `platform` - Platform identifier (records and radius are keyed by it)
/// * `daily_limit` - Per-day item ceiling, if configured
/// * `center` - Exploration center
/// * `limit` - Maximum number of candidates to return
/// * `now` - The run clock, for the quota's day boundary
pub fn generate_progressive_coordinates(
    store: &dyn Store,
    platform: &str,
    daily_limit: Option<u64>,
    center: Coordinates,
    limit: usize,
    now: DateTime<Local>,
) -> StorageResult<Vec<Coordinates>> {
    if daily_limit_reached(store, platform, daily_limit, now)? {
        tracing::info!(platform, "Daily limit reached, no coordinates to explore");
        return Ok(Vec::new());
    }

    let radius = current_search_radius(store, platform)?;
    let indexed = store.coordinates_for(platform)?;

    let candidates = spiral_coordinates(center.x, center.y, radius)
        .into_iter()
        .filter(|cell| !indexed.contains(cell))
        .take(limit)
        .collect();

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::IndexedRecord;
    use crate::storage::SqliteStorage;
    use chrono::Utc;

    fn record_at(cell: Coordinates, at: DateTime<Utc>) -> IndexedRecord {
        IndexedRecord {
            source_platform: "gridverse".to_string(),
            external_id: format!("scene-{}", cell),
            content_type: "scene".to_string(),
            title: None,
            description: None,
            author: None,
            coordinates: Some(cell),
            metadata: serde_json::Value::Object(serde_json::Map::new()),
            last_indexed_at: at,
        }
    }

    #[test]
    fn test_generates_up_to_limit() {
        let store = SqliteStorage::new_in_memory().unwrap();

        let coords = generate_progressive_coordinates(
            &store,
            "gridverse",
            None,
            Coordinates::new(0, 0),
            10,
            Local::now(),
        )
        .unwrap();

        assert_eq!(coords.len(), 10);
        assert_eq!(coords[0], Coordinates::new(0, 0));
    }

    #[test]
    fn test_excludes_already_indexed_cells() {
        let mut store = SqliteStorage::new_in_memory().unwrap();
        store
            .upsert_record(&record_at(Coordinates::new(0, 0), Utc::now()))
            .unwrap();

        let coords = generate_progressive_coordinates(
            &store,
            "gridverse",
            None,
            Coordinates::new(0, 0),
            10,
            Local::now(),
        )
        .unwrap();

        assert!(!coords.contains(&Coordinates::new(0, 0)));
        assert!(!coords.is_empty());
    }

    #[test]
    fn test_empty_when_daily_limit_reached() {
        let mut store = SqliteStorage::new_in_memory().unwrap();
        for x in 0..3 {
            store
                .upsert_record(&record_at(Coordinates::new(x, 99), Utc::now()))
                .unwrap();
        }

        let coords = generate_progressive_coordinates(
            &store,
            "gridverse",
            Some(3),
            Coordinates::new(0, 0),
            10,
            Local::now(),
        )
        .unwrap();

        assert!(coords.is_empty());
    }

    #[test]
    fn test_exclusion_is_platform_scoped() {
        let mut store = SqliteStorage::new_in_memory().unwrap();
        let mut foreign = record_at(Coordinates::new(0, 0), Utc::now());
        foreign.source_platform = "otherverse".to_string();
        store.upsert_record(&foreign).unwrap();

        let coords = generate_progressive_coordinates(
            &store,
            "gridverse",
            None,
            Coordinates::new(0, 0),
            5,
            Local::now(),
        )
        .unwrap();

        // Another platform's records do not mask gridverse cells
        assert!(coords.contains(&Coordinates::new(0, 0)));
    }

    #[test]
    fn test_respects_persisted_radius() {
        let mut store = SqliteStorage::new_in_memory().unwrap();
        store.save_search_radius("gridverse", 1).unwrap();

        let coords = generate_progressive_coordinates(
            &store,
            "gridverse",
            None,
            Coordinates::new(0, 0),
            1000,
            Local::now(),
        )
        .unwrap();

        // Radius 1 covers exactly a 3x3 block
        assert_eq!(coords.len(), 9);
    }

    #[test]
    fn test_strategy_kind_tags() {
        let grid = ExplorationStrategy::CoordinateGrid {
            center: Coordinates::new(0, 0),
            scenes_url: "https://example.com/scenes".to_string(),
        };
        let sitemap = ExplorationStrategy::SitemapListing {
            sitemap_url: "https://example.com/sitemap.xml".to_string(),
        };

        assert_eq!(grid.kind(), "coordinates");
        assert_eq!(sitemap.kind(), "sitemap");
    }
}
