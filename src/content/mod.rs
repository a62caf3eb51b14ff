//! Canonical content model
//!
//! This module defines the store-resident representation of one piece of
//! external content, plus per-platform normalization and the reconciliation
//! engine that keeps the local catalog aligned with each platform's current
//! listing.

pub mod normalize;
pub mod reconcile;

pub use normalize::{normalize_scene, normalize_sitemap_entry};
pub use reconcile::{sync, SyncOutcome};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D integer coordinate pair on a spatial platform's grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Parses a pointer string of the form "x,y"
    pub fn from_pointer(pointer: &str) -> Option<Self> {
        let (x, y) = pointer.split_once(',')?;
        Some(Self {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// The canonical catalog entry for one piece of external content
///
/// Uniqueness is `(source_platform, external_id)`. A record present today
/// but absent from the platform's current listing is deleted during
/// reconciliation, never left stale beyond one run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    /// Identifier of the origin system (e.g. "gridverse")
    pub source_platform: String,

    /// Platform-scoped unique identifier
    pub external_id: String,

    /// Small enumerated tag (e.g. "scene", "experience")
    pub content_type: String,

    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,

    /// Present only for spatial platforms
    pub coordinates: Option<Coordinates>,

    /// Open key/value map for platform-specific extras (e.g. source URL)
    pub metadata: serde_json::Value,

    /// Timestamp of the last successful observation
    pub last_indexed_at: DateTime<Utc>,
}
