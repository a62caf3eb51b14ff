//! Metaindex: a progressive content-indexing engine
//!
//! This crate incrementally discovers, fetches, normalizes, rate-limits, and
//! reconciles externally-hosted content records ("experiences") from
//! third-party metaverse platforms into a canonical local catalog.

pub mod config;
pub mod content;
pub mod explore;
pub mod fetch;
pub mod indexer;
pub mod sitemap;
pub mod storage;

use thiserror::Error;

/// Main error type for Metaindex operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Platform is disabled: {0}")]
    PlatformDisabled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Metaindex operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use content::{Coordinates, IndexedRecord};
pub use indexer::{Indexer, IndexingRun, RunStatus};
