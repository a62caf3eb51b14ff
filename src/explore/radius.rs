//! Adaptive search radius state
//!
//! Coordinate platforms are explored with a persisted, monotonically
//! expandable radius: runs that find nothing new widen the net for next
//! time instead of re-walking the same cells. The expansion arithmetic is
//! pure; persistence is injected through the store at the call boundary.

use crate::storage::{StorageResult, Store};

/// Radius used when no value has been persisted yet
pub const DEFAULT_SEARCH_RADIUS: u32 = 5;

/// Amount added per expansion
pub const RADIUS_STEP: u32 = 5;

/// Ceiling the radius clamps to
pub const MAX_SEARCH_RADIUS: u32 = 50;

/// Pure expansion step: one increment, clamped at the ceiling
pub fn expanded(radius: u32) -> u32 {
    (radius + RADIUS_STEP).min(MAX_SEARCH_RADIUS)
}

/// Reads the current search radius for an indexer
///
/// Falls back to [`DEFAULT_SEARCH_RADIUS`] when nothing has been persisted.
pub fn current_search_radius(store: &dyn Store, indexer: &str) -> StorageResult<u32> {
    Ok(store
        .load_search_radius(indexer)?
        .unwrap_or(DEFAULT_SEARCH_RADIUS))
}

/// Expands the persisted search radius by one step
///
/// The clamped value is persisted even when expansion was a no-op, so a
/// radius stored above the ceiling by an older version settles back to it.
///
/// # Returns
///
/// The new effective radius
pub fn expand_search_radius(store: &mut dyn Store, indexer: &str) -> StorageResult<u32> {
    let current = current_search_radius(store, indexer)?;
    let next = expanded(current);

    store.save_search_radius(indexer, next)?;

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_expanded_is_clamped() {
        assert_eq!(expanded(5), 10);
        assert_eq!(expanded(45), 50);
        assert_eq!(expanded(48), 50);
        assert_eq!(expanded(50), 50);
        assert_eq!(expanded(60), 50);
    }

    #[test]
    fn test_default_radius_when_unpersisted() {
        let store = SqliteStorage::new_in_memory().unwrap();
        let radius = current_search_radius(&store, "gridverse").unwrap();
        assert_eq!(radius, DEFAULT_SEARCH_RADIUS);
    }

    #[test]
    fn test_expand_increases_by_step() {
        let mut store = SqliteStorage::new_in_memory().unwrap();

        let initial = current_search_radius(&store, "gridverse").unwrap();
        let next = expand_search_radius(&mut store, "gridverse").unwrap();

        assert_eq!(next, initial + RADIUS_STEP);
        assert_eq!(current_search_radius(&store, "gridverse").unwrap(), next);
    }

    #[test]
    fn test_expand_caps_at_ceiling() {
        let mut store = SqliteStorage::new_in_memory().unwrap();
        store.save_search_radius("gridverse", 48).unwrap();

        let next = expand_search_radius(&mut store, "gridverse").unwrap();

        // Caps at 50, not 53
        assert_eq!(next, 50);
        assert_eq!(current_search_radius(&store, "gridverse").unwrap(), 50);
    }

    #[test]
    fn test_repeated_expansion_converges_to_ceiling() {
        let mut store = SqliteStorage::new_in_memory().unwrap();

        let mut radius = current_search_radius(&store, "gridverse").unwrap();
        for _ in 0..20 {
            radius = expand_search_radius(&mut store, "gridverse").unwrap();
            assert!(radius <= MAX_SEARCH_RADIUS);
        }

        assert_eq!(radius, MAX_SEARCH_RADIUS);
    }

    #[test]
    fn test_radius_is_scoped_per_indexer() {
        let mut store = SqliteStorage::new_in_memory().unwrap();
        expand_search_radius(&mut store, "gridverse").unwrap();

        assert_eq!(
            current_search_radius(&store, "otherverse").unwrap(),
            DEFAULT_SEARCH_RADIUS
        );
    }

    #[test]
    fn test_radius_survives_across_instances() {
        // Radius persists in the store, not in any indexer instance
        let mut store = SqliteStorage::new_in_memory().unwrap();
        let expanded_to = expand_search_radius(&mut store, "gridverse").unwrap();

        let reloaded = current_search_radius(&store, "gridverse").unwrap();
        assert_eq!(reloaded, expanded_to);
    }
}
