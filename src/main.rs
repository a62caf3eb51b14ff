//! Metaindex main entry point
//!
//! This is the command-line interface for the Metaindex content-indexing
//! engine.

use clap::Parser;
use metaindex::config::load_config_with_hash;
use metaindex::fetch::FetchCache;
use metaindex::indexer::{enabled_platforms, Indexer, RunStatus};
use metaindex::storage::SqliteStorage;
use metaindex::IndexingRun;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Metaindex: a progressive content-indexing engine
///
/// Metaindex discovers and catalogs externally-hosted experiences from
/// configured platforms, respecting per-platform rate limits and daily
/// quotas, and reconciling the local catalog against each platform's
/// current listing.
#[derive(Parser, Debug)]
#[command(name = "metaindex")]
#[command(version = "1.0.0")]
#[command(about = "A progressive content-indexing engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Run the indexer for a single platform
    #[arg(long, conflicts_with_all = ["all", "runs", "status", "clear_cache"])]
    platform: Option<String>,

    /// Run the indexers for every enabled platform, sequentially
    #[arg(long, conflicts_with_all = ["runs", "status", "clear_cache"])]
    all: bool,

    /// Show recent indexing runs and exit
    #[arg(long, conflicts_with_all = ["status", "clear_cache"])]
    runs: bool,

    /// Show one indexing run by ID and exit
    #[arg(long, value_name = "RUN_ID", conflicts_with = "clear_cache")]
    status: Option<i64>,

    /// Clear the fetch cache for a platform and exit
    #[arg(long, value_name = "PLATFORM")]
    clear_cache: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.runs {
        handle_runs(&config)?;
    } else if let Some(run_id) = cli.status {
        handle_status(&config, run_id)?;
    } else if let Some(platform) = cli.clear_cache {
        handle_clear_cache(&config, &platform)?;
    } else if let Some(platform) = cli.platform {
        handle_run(&config, &config_hash, &platform).await?;
    } else if cli.all {
        handle_run_all(&config, &config_hash).await?;
    } else {
        handle_list(&config);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("metaindex=info,warn"),
            1 => EnvFilter::new("metaindex=debug,info"),
            2 => EnvFilter::new("metaindex=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Default mode: shows the configured platforms
fn handle_list(config: &metaindex::Config) {
    println!("=== Configured Platforms ===\n");

    if config.platforms.is_empty() {
        println!("No platforms configured.");
        return;
    }

    for (name, platform) in &config.platforms {
        let state = if platform.enabled { "enabled" } else { "disabled" };
        println!("  {} ({:?} strategy, {})", name, platform.strategy, state);
    }

    let enabled = enabled_platforms(config);
    println!(
        "\n{} of {} platforms enabled. Use --platform <name> or --all to index.",
        enabled.len(),
        config.platforms.len()
    );
}

/// Runs the indexer for one platform
async fn handle_run(
    config: &metaindex::Config,
    config_hash: &str,
    platform: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut indexer = Indexer::new(config, config_hash, platform)?;
    let run = indexer.run().await?;

    print_run(&run);

    if run.status == RunStatus::Failed {
        let message = run
            .error_message
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(format!("Indexing run {} failed: {}", run.id, message).into());
    }

    Ok(())
}

/// Runs every enabled platform sequentially
///
/// A failed platform does not stop the remaining ones; the overall exit
/// status reflects whether any platform failed.
async fn handle_run_all(
    config: &metaindex::Config,
    config_hash: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let platforms = enabled_platforms(config);

    if platforms.is_empty() {
        println!("No platforms enabled; nothing to do.");
        return Ok(());
    }

    let mut failures = Vec::new();

    for platform in &platforms {
        tracing::info!("Indexing platform: {}", platform);

        match handle_run(config, config_hash, platform).await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Platform {} failed: {}", platform, e);
                failures.push(platform.clone());
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} platform(s) failed: {}", failures.len(), failures.join(", ")).into())
    }
}

/// Handles the --runs mode: shows recent indexing runs
fn handle_runs(config: &metaindex::Config) -> Result<(), Box<dyn std::error::Error>> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let runs = metaindex::indexer::recent_runs(&storage, 20)?;

    println!("=== Recent Indexing Runs ===\n");

    if runs.is_empty() {
        println!("No runs recorded yet.");
        return Ok(());
    }

    for run in &runs {
        println!(
            "  #{} {} [{}] processed={} failed={} duration={} success={}%",
            run.id,
            run.platform,
            run.status.to_db_string(),
            run.items_processed,
            run.items_failed,
            run.duration_formatted(),
            run.success_rate()
        );
    }

    Ok(())
}

/// Handles the --status mode: shows one run in detail
fn handle_status(
    config: &metaindex::Config,
    run_id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let run = metaindex::indexer::status(&storage, run_id)?;

    print_run(&run);

    Ok(())
}

/// Handles the --clear-cache mode: drops a platform's cached fetches
fn handle_clear_cache(
    config: &metaindex::Config,
    platform: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    let cache = FetchCache::new(platform, true, 1);
    cache.invalidate_all(&mut storage);

    println!("✓ Cleared cached fetches for platform '{}'", platform);

    Ok(())
}

fn print_run(run: &IndexingRun) {
    println!("\n=== Indexing Run #{} ===", run.id);
    println!("  Platform:   {}", run.platform);
    println!("  Status:     {}", run.status.to_db_string());
    println!("  Processed:  {}", run.items_processed);
    println!("  Failed:     {}", run.items_failed);
    println!("  Duration:   {}", run.duration_formatted());
    println!("  Success:    {}%", run.success_rate());

    if let Some(error) = &run.error_message {
        println!("  Error:      {}", error);
    }
}
