//! Indexing orchestrator
//!
//! Ties the engine together into one bounded run per platform:
//! quota gate, candidate discovery via the platform's exploration strategy,
//! rate-limited/retried/cached fetching, normalization, reconciliation, and
//! run finalization. Candidates are processed sequentially; per-candidate
//! errors are counted and skipped, while anti-bot blocks and bookkeeping
//! failures abort the run.

use crate::config::Config;
use crate::content::{normalize_scene, normalize_sitemap_entry, reconcile, Coordinates};
use crate::explore::{
    daily_limit_reached, expand_search_radius, generate_progressive_coordinates,
    ExplorationStrategy,
};
use crate::fetch::{
    build_http_client, fetch_text, with_retry, FetchCache, FetchError, RateLimiter, RetryPolicy,
};
use crate::indexer::progress::{
    report_best_effort, ProgressContext, ProgressLevel, ProgressReporter, TracingReporter,
};
use crate::indexer::registry::{resolve, ResolvedPlatform};
use crate::indexer::{IndexingRun, RunStatus};
use crate::storage::{SqliteStorage, Store};
use crate::{IndexError, Result};
use chrono::{Local, Utc};
use reqwest::Client;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative cancellation handle for a running indexer
///
/// Checked between candidates, never mid-fetch; a cancelled run concludes
/// with whatever it processed so far.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One platform indexer, owning its fetch stack and store handle
///
/// Instances are single-use per run sequence and never shared across
/// tasks; concurrent indexing of different platforms uses one instance
/// each.
pub struct Indexer {
    platform: ResolvedPlatform,
    client: Client,
    limiter: RateLimiter,
    retry: RetryPolicy,
    cache: FetchCache,
    store: SqliteStorage,
    reporter: Box<dyn ProgressReporter>,
    cancel: CancelFlag,
    config_hash: String,
    run_id: Option<i64>,
}

impl Indexer {
    /// Builds an indexer for one configured platform
    ///
    /// # Arguments
    ///
    /// * `config` - The loaded configuration
    /// * `config_hash` - Integrity hash recorded on each run
    /// * `platform_name` - Which `[platforms.<name>]` entry to index
    pub fn new(config: &Config, config_hash: &str, platform_name: &str) -> Result<Self> {
        let platform = resolve(config, platform_name)?;

        let store = SqliteStorage::new(Path::new(&config.output.database_path))?;

        let client = build_http_client(
            &config.user_agent,
            &platform.name,
            Duration::from_secs(platform.settings.timeout),
        )?;

        let limiter = RateLimiter::new(platform.settings.rate_limit);

        let retry = RetryPolicy::new(
            config.global.max_retries,
            Duration::from_secs_f64(config.global.retry_delay.max(0.0)),
        );

        let cache = FetchCache::new(
            &platform.name,
            config.global.enable_caching,
            platform.settings.cache_duration,
        );

        Ok(Self {
            platform,
            client,
            limiter,
            retry,
            cache,
            store,
            reporter: Box::new(TracingReporter),
            cancel: CancelFlag::new(),
            config_hash: config_hash.to_string(),
            run_id: None,
        })
    }

    /// Replaces the progress sink (the default reports through tracing)
    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Handle for cooperative cancellation of the current/next run
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Executes one bounded indexing run
    ///
    /// The run record is created on entry and finalized on every exit path;
    /// the returned run carries the terminal status, counters, and error
    /// message. Only infrastructure failures around run bookkeeping surface
    /// as `Err`.
    pub async fn run(&mut self) -> Result<IndexingRun> {
        let run_id = self
            .store
            .create_run(&self.platform.name, &self.config_hash)?;
        self.run_id = Some(run_id);
        let mut run = self.store.get_run(run_id)?;

        self.report(
            ProgressLevel::Info,
            &format!(
                "Starting indexing run ({} strategy)",
                self.platform.strategy.kind()
            ),
        );

        match self.execute(&mut run).await {
            Ok(()) => {
                run.status = RunStatus::Succeeded;
            }
            Err(error) => {
                run.status = RunStatus::Failed;
                run.error_message = Some(error.to_string());
                self.report(
                    ProgressLevel::Error,
                    &format!("Indexing run failed: {}", error),
                );
            }
        }

        run.ended_at = Some(Utc::now());
        self.store.update_run(&run)?;
        self.log_summary(&run);
        self.run_id = None;

        Ok(run)
    }

    async fn execute(&mut self, run: &mut IndexingRun) -> Result<()> {
        let reached = daily_limit_reached(
            &self.store,
            &self.platform.name,
            self.platform.settings.daily_limit,
            Local::now(),
        )?;

        if reached {
            self.report(
                ProgressLevel::Info,
                "Daily limit reached, finishing without new items",
            );
            return Ok(());
        }

        match self.platform.strategy.clone() {
            ExplorationStrategy::CoordinateGrid { center, scenes_url } => {
                self.run_coordinate_grid(run, center, &scenes_url).await
            }
            ExplorationStrategy::SitemapListing { sitemap_url } => {
                self.run_sitemap_listing(run, &sitemap_url).await
            }
        }
    }

    /// Coordinate-grid runs: visit unexplored cells, widen the net when a
    /// full pass finds nothing new
    async fn run_coordinate_grid(
        &mut self,
        run: &mut IndexingRun,
        center: Coordinates,
        scenes_url: &str,
    ) -> Result<()> {
        let candidates = generate_progressive_coordinates(
            &self.store,
            &self.platform.name,
            self.platform.settings.daily_limit,
            center,
            self.platform.settings.max_items,
            Local::now(),
        )?;

        self.report(
            ProgressLevel::Info,
            &format!("Exploring {} candidate cells", candidates.len()),
        );

        let batch_size = self.platform.settings.batch_size;
        let mut new_items: u64 = 0;
        let mut cancelled = false;

        'batches: for batch in candidates.chunks(batch_size) {
            for cell in batch {
                if self.cancel.is_cancelled() {
                    self.report(
                        ProgressLevel::Warn,
                        "Cancellation requested, concluding run early",
                    );
                    cancelled = true;
                    break 'batches;
                }

                match self.process_cell(run, *cell, scenes_url).await {
                    Ok(saved) => new_items += saved,
                    Err(error) if is_block(&error) => return Err(error),
                    Err(error) => {
                        run.items_failed += 1;
                        self.store.update_run(run)?;
                        self.report(
                            ProgressLevel::Error,
                            &format!("Failed to process cell {}: {}", cell, error),
                        );
                    }
                }
            }

            self.sleep_between_batches().await;
        }

        if new_items == 0 && !cancelled {
            let radius = expand_search_radius(&mut self.store, &self.platform.name)?;
            self.report(
                ProgressLevel::Info,
                &format!("No new items found, expanded search radius to {}", radius),
            );
        }

        Ok(())
    }

    /// Fetches and catalogs the scene entities published for one cell
    async fn process_cell(
        &mut self,
        run: &mut IndexingRun,
        cell: Coordinates,
        scenes_url: &str,
    ) -> Result<u64> {
        let url = format!("{}?pointer={}", scenes_url, cell);
        let pointer = cell.to_string();

        let fetch_url = url.clone();
        let cache = &self.cache;
        let limiter = &mut self.limiter;
        let retry = &self.retry;
        let client = &self.client;
        let store = &mut self.store;

        let body = cache
            .fetch_through(store, &["scenes", &pointer], || async move {
                limiter.wait_if_needed().await;
                with_retry(retry, || fetch_text(client, &fetch_url)).await
            })
            .await?;

        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let Some(scenes) = payload.as_array() else {
            self.report(
                ProgressLevel::Warn,
                &format!("Unexpected payload shape from {}, expected an array", url),
            );
            return Ok(0);
        };

        let mut saved: u64 = 0;
        let now = Utc::now();

        for scene in scenes {
            if let Some(record) = normalize_scene(&self.platform.name, scene, now) {
                self.store.upsert_record(&record)?;
                run.items_processed += 1;
                saved += 1;
                tracing::debug!(external_id = %record.external_id, "Catalogued scene");
            }
        }

        self.store.update_run(run)?;

        Ok(saved)
    }

    /// Sitemap runs: the listing is the platform's full catalog, so it is
    /// reconciled before entries are (re)catalogued
    async fn run_sitemap_listing(&mut self, run: &mut IndexingRun, sitemap_url: &str) -> Result<()> {
        let fetch_url = sitemap_url.to_string();
        let cache = &self.cache;
        let limiter = &mut self.limiter;
        let retry = &self.retry;
        let client = &self.client;
        let store = &mut self.store;

        let body = cache
            .fetch_through(store, &["sitemap"], || async move {
                limiter.wait_if_needed().await;
                with_retry(retry, || fetch_text(client, &fetch_url)).await
            })
            .await?;

        let entries = crate::sitemap::parse_sitemap(&body);

        if entries.is_empty() {
            // An empty listing is indistinguishable from a transient
            // upstream failure that slipped past retries; reconciling here
            // would wipe the platform's catalog on bad data. Skip it and
            // let the next successful run converge.
            self.report(
                ProgressLevel::Warn,
                "Sitemap yielded no entries, skipping reconciliation for this run",
            );
            return Ok(());
        }

        self.report(
            ProgressLevel::Info,
            &format!("Discovered {} sitemap entries", entries.len()),
        );

        let current: HashSet<String> = entries.iter().map(|e| e.uuid.clone()).collect();
        let outcome = reconcile::sync(&mut self.store, &self.platform.name, &current)?;
        self.report(
            ProgressLevel::Info,
            &format!("Reconciliation complete: {}", outcome),
        );

        let batch_size = self.platform.settings.batch_size;
        let to_process: Vec<_> = entries
            .iter()
            .take(self.platform.settings.max_items)
            .collect();

        for batch in to_process.chunks(batch_size) {
            for entry in batch {
                if self.cancel.is_cancelled() {
                    self.report(
                        ProgressLevel::Warn,
                        "Cancellation requested, concluding run early",
                    );
                    self.store.update_run(run)?;
                    return Ok(());
                }

                let record = normalize_sitemap_entry(&self.platform.name, entry, Utc::now());
                match self.store.upsert_record(&record) {
                    Ok(()) => run.items_processed += 1,
                    Err(error) => {
                        run.items_failed += 1;
                        self.report(
                            ProgressLevel::Error,
                            &format!("Failed to store entry {}: {}", entry.uuid, error),
                        );
                    }
                }
            }

            self.store.update_run(run)?;
            self.sleep_between_batches().await;
        }

        Ok(())
    }

    /// Batch pacing: only applies when rate limiting is active
    async fn sleep_between_batches(&self) {
        let delay = self.platform.settings.batch_delay;
        if self.limiter.is_enabled() && delay > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;
        }
    }

    fn report(&mut self, level: ProgressLevel, message: &str) {
        let mut context = ProgressContext::new();
        context.insert("platform", self.platform.name.clone());
        if let Some(run_id) = self.run_id {
            context.insert("run_id", run_id.to_string());
        }

        report_best_effort(self.reporter.as_mut(), level, message, &context);
    }

    fn log_summary(&mut self, run: &IndexingRun) {
        let message = format!(
            "Indexing finished: status={}, duration={}, processed={}, failed={}, success rate={}%",
            run.status.to_db_string(),
            run.duration_formatted(),
            run.items_processed,
            run.items_failed,
            run.success_rate()
        );
        self.report(ProgressLevel::Info, &message);
    }
}

fn is_block(error: &IndexError) -> bool {
    matches!(error, IndexError::Fetch(fetch) if fetch.is_block())
}

/// Looks up a run for display
pub fn status(store: &dyn Store, run_id: i64) -> Result<IndexingRun> {
    Ok(store.get_run(run_id)?)
}

/// Most recent runs across all platforms, newest first
pub fn recent_runs(store: &dyn Store, limit: usize) -> Result<Vec<IndexingRun>> {
    Ok(store.recent_runs(limit)?)
}

/// Most recent runs for one platform, newest first
pub fn platform_runs(store: &dyn Store, platform: &str, limit: usize) -> Result<Vec<IndexingRun>> {
    Ok(store.runs_for_platform(platform, limit)?)
}
