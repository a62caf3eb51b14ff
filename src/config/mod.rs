//! Configuration loading, validation, and per-platform resolution
//!
//! Configuration is TOML with a `[global]` defaults table, a `[user-agent]`
//! identification block, and one `[platforms.<name>]` table per indexer.
//! Platform-specific values override the global defaults.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{
    Config, GlobalConfig, OutputConfig, PlatformConfig, PlatformSettings, StrategyKind,
    UserAgentConfig,
};
pub use validation::validate;
