//! Per-platform content normalization
//!
//! The one place where per-platform polymorphism is required: each strategy
//! family maps its raw records into the canonical schema. The mappings are
//! pure; persistence happens at the orchestrator boundary.

use crate::content::{Coordinates, IndexedRecord};
use crate::sitemap::{clean_title, decode_title, SitemapEntry};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Normalizes one scene entity from a coordinate platform's content API
///
/// Returns `None` when the payload carries neither an entity ID nor a
/// usable pointer, in which case there is nothing to catalog.
///
/// # Arguments
///
/// * `platform` - The platform identifier
/// * `scene` - One entity from the scenes endpoint response
/// * `now` - Observation timestamp for the record
pub fn normalize_scene(platform: &str, scene: &Value, now: DateTime<Utc>) -> Option<IndexedRecord> {
    let coordinates = scene["pointers"][0]
        .as_str()
        .and_then(Coordinates::from_pointer);

    let external_id = match scene["id"].as_str() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => coordinates?.to_string(),
    };

    let display = &scene["metadata"]["display"];

    let title = display["title"]
        .as_str()
        .map(str::to_string)
        .or_else(|| coordinates.map(|c| format!("Scene ({}, {})", c.x, c.y)));

    let description = display["description"]
        .as_str()
        .map(str::to_string)
        .or_else(|| coordinates.map(|c| format!("Scene at coordinates ({}, {})", c.x, c.y)));

    let author = scene["metadata"]["contact"]["name"]
        .as_str()
        .or_else(|| scene["metadata"]["owner"].as_str())
        .map(str::to_string);

    let metadata = json!({
        "scene_id": scene["id"].as_str(),
        "scene_type": scene["type"].as_str(),
        "timestamp": scene["timestamp"].clone(),
        "pointers": scene["pointers"].clone(),
        "content_files_count": scene["content"].as_array().map(Vec::len).unwrap_or(0),
    });

    Some(IndexedRecord {
        source_platform: platform.to_string(),
        external_id,
        content_type: scene["type"].as_str().unwrap_or("scene").to_string(),
        title,
        description,
        author,
        coordinates,
        metadata,
        last_indexed_at: now,
    })
}

/// Normalizes one sitemap entry from a listing platform
///
/// Sitemap platforms carry no description, author, or coordinates; the
/// source URL and discovery row go into the metadata map instead.
pub fn normalize_sitemap_entry(
    platform: &str,
    entry: &SitemapEntry,
    now: DateTime<Utc>,
) -> IndexedRecord {
    let decoded = decode_title(&entry.title);
    let cleaned = clean_title(Some(decoded.as_str()));
    let title = if cleaned.is_empty() { None } else { Some(cleaned) };

    let metadata = json!({
        "source_url": entry.url,
        "sitemap_row": entry.row_index,
        "original_title": entry.title,
    });

    IndexedRecord {
        source_platform: platform.to_string(),
        external_id: entry.uuid.clone(),
        content_type: "experience".to_string(),
        title,
        description: None,
        author: None,
        coordinates: None,
        metadata,
        last_indexed_at: now,
    }
}
