//! Platform registry
//!
//! Maps platform identifiers to their resolved configuration and
//! exploration strategy. Platforms are opt-in: only entries explicitly
//! enabled in configuration are eligible to run.

use crate::config::{Config, PlatformSettings, StrategyKind};
use crate::content::Coordinates;
use crate::explore::ExplorationStrategy;
use crate::{ConfigError, IndexError};

/// A platform resolved and validated for indexing
#[derive(Debug, Clone)]
pub struct ResolvedPlatform {
    pub name: String,
    pub settings: PlatformSettings,
    pub strategy: ExplorationStrategy,
}

/// Lists the platforms enabled in configuration, in name order
pub fn enabled_platforms(config: &Config) -> Vec<String> {
    config
        .platforms
        .iter()
        .filter(|(_, platform)| platform.enabled)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Resolves a platform identifier into a runnable description
///
/// # Errors
///
/// * `UnknownPlatform` - No such platform is configured
/// * `PlatformDisabled` - The platform exists but is not enabled
/// * `Config` - The strategy is missing its endpoint
pub fn resolve(config: &Config, name: &str) -> Result<ResolvedPlatform, IndexError> {
    let platform = config
        .platform(name)
        .ok_or_else(|| IndexError::UnknownPlatform(name.to_string()))?;

    if !platform.enabled {
        return Err(IndexError::PlatformDisabled(name.to_string()));
    }

    let settings = config
        .settings_for(name)
        .ok_or_else(|| IndexError::UnknownPlatform(name.to_string()))?;

    let strategy = match platform.strategy {
        StrategyKind::Coordinates => {
            let scenes_url = platform.scenes_url.clone().ok_or_else(|| {
                ConfigError::Validation(format!(
                    "Platform '{}': coordinates strategy requires scenes-url",
                    name
                ))
            })?;
            ExplorationStrategy::CoordinateGrid {
                center: Coordinates::new(platform.center_x, platform.center_y),
                scenes_url,
            }
        }
        StrategyKind::Sitemap => {
            let sitemap_url = platform.sitemap_url.clone().ok_or_else(|| {
                ConfigError::Validation(format!(
                    "Platform '{}': sitemap strategy requires sitemap-url",
                    name
                ))
            })?;
            ExplorationStrategy::SitemapListing { sitemap_url }
        }
    };

    Ok(ResolvedPlatform {
        name: name.to_string(),
        settings,
        strategy,
    })
}
