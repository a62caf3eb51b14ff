//! Indexer orchestration
//!
//! This module contains the run model, the platform registry, the progress
//! reporting boundary, and the orchestrator that drives one bounded
//! indexing run per platform.

mod orchestrator;
mod progress;
mod registry;
mod run;

pub use orchestrator::{platform_runs, recent_runs, status, CancelFlag, Indexer};
pub use progress::{
    report_best_effort, ProgressContext, ProgressLevel, ProgressReporter, TracingReporter,
};
pub use registry::{enabled_platforms, resolve, ResolvedPlatform};
pub use run::{IndexingRun, RunStatus};
