use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Metaindex
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformConfig>,
}

/// Process-wide indexer defaults
///
/// Every field here can be overridden per platform; indexer-specific
/// overrides win over these defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Additional retry attempts after the first failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Fixed delay between retry attempts (seconds)
    #[serde(rename = "retry-delay")]
    pub retry_delay: f64,

    /// Request timeout (seconds)
    #[serde(rename = "default-timeout")]
    pub default_timeout: u64,

    /// Global switch for the durable fetch cache
    #[serde(rename = "enable-caching")]
    pub enable_caching: bool,

    /// Default cache entry lifetime (seconds); zero disables caching
    #[serde(rename = "cache-duration")]
    pub cache_duration: u64,

    /// Default requests per second; zero disables rate limiting
    #[serde(rename = "rate-limit")]
    pub rate_limit: f64,

    /// Candidates processed between batch delays
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Pause between batches (seconds)
    #[serde(rename = "batch-delay")]
    pub batch_delay: f64,

    /// Upper bound on candidates per run
    #[serde(rename = "max-items")]
    pub max_items: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: 5.0,
            default_timeout: 30,
            enable_caching: true,
            cache_duration: 3600,
            rate_limit: 1.0,
            batch_size: 50,
            batch_delay: 1.0,
            max_items: 100,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the indexer
    #[serde(rename = "indexer-name")]
    pub indexer_name: String,

    /// Version of the indexer
    #[serde(rename = "indexer-version")]
    pub indexer_version: String,

    /// URL with information about the indexer
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for indexer-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite catalog file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Exploration strategy selector for a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Enumerate a 2D coordinate grid in expanding rings
    Coordinates,
    /// Crawl the platform's published sitemap listing
    Sitemap,
}

/// Per-platform indexer configuration
///
/// Optional fields fall back to the `[global]` defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Platforms are opt-in; disabled platforms are never indexed
    #[serde(default)]
    pub enabled: bool,

    pub strategy: StrategyKind,

    #[serde(rename = "rate-limit")]
    pub rate_limit: Option<f64>,

    /// Per-day ceiling on indexed items; zero or absent means unlimited
    #[serde(rename = "daily-limit")]
    pub daily_limit: Option<u64>,

    #[serde(rename = "cache-duration")]
    pub cache_duration: Option<u64>,

    pub timeout: Option<u64>,

    #[serde(rename = "batch-size")]
    pub batch_size: Option<usize>,

    #[serde(rename = "batch-delay")]
    pub batch_delay: Option<f64>,

    #[serde(rename = "max-items")]
    pub max_items: Option<usize>,

    /// Content entities endpoint (coordinates strategy)
    #[serde(rename = "scenes-url")]
    pub scenes_url: Option<String>,

    /// Exploration center (coordinates strategy), defaults to the origin
    #[serde(rename = "center-x", default)]
    pub center_x: i32,
    #[serde(rename = "center-y", default)]
    pub center_y: i32,

    /// Sitemap document URL (sitemap strategy)
    #[serde(rename = "sitemap-url")]
    pub sitemap_url: Option<String>,
}

/// Fully resolved per-platform settings after merging global defaults
#[derive(Debug, Clone)]
pub struct PlatformSettings {
    pub rate_limit: f64,
    pub daily_limit: Option<u64>,
    pub cache_duration: u64,
    pub timeout: u64,
    pub batch_size: usize,
    pub batch_delay: f64,
    pub max_items: usize,
}

impl Config {
    /// Looks up the raw configuration for a platform
    pub fn platform(&self, name: &str) -> Option<&PlatformConfig> {
        self.platforms.get(name)
    }

    /// Resolves effective settings for a platform, merging its overrides
    /// over the global defaults
    pub fn settings_for(&self, name: &str) -> Option<PlatformSettings> {
        let platform = self.platforms.get(name)?;
        let global = &self.global;

        // A zero daily limit means "no limit" rather than "nothing allowed"
        let daily_limit = platform.daily_limit.filter(|limit| *limit > 0);

        Some(PlatformSettings {
            rate_limit: platform.rate_limit.unwrap_or(global.rate_limit),
            daily_limit,
            cache_duration: platform.cache_duration.unwrap_or(global.cache_duration),
            timeout: platform.timeout.unwrap_or(global.default_timeout),
            batch_size: platform.batch_size.unwrap_or(global.batch_size),
            batch_delay: platform.batch_delay.unwrap_or(global.batch_delay),
            max_items: platform.max_items.unwrap_or(global.max_items),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(platform: PlatformConfig) -> Config {
        let mut platforms = BTreeMap::new();
        platforms.insert("testverse".to_string(), platform);

        Config {
            global: GlobalConfig::default(),
            user_agent: UserAgentConfig {
                indexer_name: "TestIndexer".to_string(),
                indexer_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            output: OutputConfig {
                database_path: "./test.db".to_string(),
            },
            platforms,
        }
    }

    fn bare_platform(strategy: StrategyKind) -> PlatformConfig {
        PlatformConfig {
            enabled: true,
            strategy,
            rate_limit: None,
            daily_limit: None,
            cache_duration: None,
            timeout: None,
            batch_size: None,
            batch_delay: None,
            max_items: None,
            scenes_url: None,
            center_x: 0,
            center_y: 0,
            sitemap_url: None,
        }
    }

    #[test]
    fn test_settings_fall_back_to_global() {
        let config = test_config(bare_platform(StrategyKind::Sitemap));
        let settings = config.settings_for("testverse").unwrap();

        assert_eq!(settings.rate_limit, 1.0);
        assert_eq!(settings.timeout, 30);
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.max_items, 100);
        assert_eq!(settings.daily_limit, None);
    }

    #[test]
    fn test_platform_overrides_win() {
        let mut platform = bare_platform(StrategyKind::Coordinates);
        platform.rate_limit = Some(5.0);
        platform.daily_limit = Some(25);
        platform.timeout = Some(45);

        let config = test_config(platform);
        let settings = config.settings_for("testverse").unwrap();

        assert_eq!(settings.rate_limit, 5.0);
        assert_eq!(settings.daily_limit, Some(25));
        assert_eq!(settings.timeout, 45);
        // Untouched fields still come from global
        assert_eq!(settings.batch_size, 50);
    }

    #[test]
    fn test_zero_daily_limit_means_unlimited() {
        let mut platform = bare_platform(StrategyKind::Coordinates);
        platform.daily_limit = Some(0);

        let config = test_config(platform);
        let settings = config.settings_for("testverse").unwrap();

        assert_eq!(settings.daily_limit, None);
    }

    #[test]
    fn test_settings_for_unknown_platform() {
        let config = test_config(bare_platform(StrategyKind::Sitemap));
        assert!(config.settings_for("nosuch").is_none());
    }
}
