//! Reconciliation engine
//!
//! A platform's current listing is ground truth: records it no longer
//! lists are purged from the local catalog as part of the same sync
//! operation. Inserting the new entries stays with the caller, and
//! existing entries are left untouched (freshness is the normalization
//! step's job).

use crate::storage::{StorageResult, Store};
use std::collections::HashSet;
use std::fmt;

/// Counts produced by one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Size of the freshly observed set
    pub total_current: usize,

    /// Observed IDs already present in the store
    pub existing: usize,

    /// Observed IDs not yet stored (the caller inserts these)
    pub new: usize,

    /// Stored IDs no longer observed; deleted by this call
    pub removed: usize,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total_current={}, existing={}, new={}, removed={}",
            self.total_current, self.existing, self.new, self.removed
        )
    }
}

/// Diffs the freshly observed external IDs against the stored set
///
/// `existing = current ∩ stored`, `new = current − stored`,
/// `removed = stored − current`; every removed record is deleted from the
/// store before this returns. Calling with an empty `current` set is legal
/// and removes everything stored for the platform; callers needing
/// protection against transient empty listings apply their own guard first.
///
/// # Arguments
///
/// * `store` - The record store to diff against and delete from
/// * `platform` - The platform whose records are reconciled
/// * `current` - The full set of external IDs observed in this run
pub fn sync(
    store: &mut dyn Store,
    platform: &str,
    current: &HashSet<String>,
) -> StorageResult<SyncOutcome> {
    let stored = store.external_ids_for(platform)?;

    let existing = current.intersection(&stored).count();
    let new = current.difference(&stored).count();
    let removed: Vec<&String> = stored.difference(current).collect();

    for external_id in &removed {
        store.delete_record(platform, external_id)?;
        tracing::debug!(platform, external_id = %external_id, "Removed delisted record");
    }

    Ok(SyncOutcome {
        total_current: current.len(),
        existing,
        new,
        removed: removed.len(),
    })
}
