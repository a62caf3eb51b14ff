//! Progress reporting boundary
//!
//! Indexing runs report progress through a sink so external collaborators
//! (logs, real-time admin broadcasts) can observe them. Sink failures must
//! never propagate into indexer failures; every report goes through the
//! best-effort wrapper.

use std::collections::BTreeMap;

/// Severity of a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured context attached to every progress event
pub type ProgressContext = BTreeMap<&'static str, String>;

/// Sink for `(level, message, context)` progress tuples
pub trait ProgressReporter {
    fn report(
        &mut self,
        level: ProgressLevel,
        message: &str,
        context: &ProgressContext,
    ) -> anyhow::Result<()>;
}

/// Reports through the sink, swallowing sink failures
///
/// A broken sink is logged at debug level and otherwise ignored; indexing
/// continues regardless.
pub fn report_best_effort(
    reporter: &mut dyn ProgressReporter,
    level: ProgressLevel,
    message: &str,
    context: &ProgressContext,
) {
    if let Err(error) = reporter.report(level, message, context) {
        tracing::debug!(error = %error, "Progress sink failed, continuing");
    }
}

/// Default sink backed by the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(
        &mut self,
        level: ProgressLevel,
        message: &str,
        context: &ProgressContext,
    ) -> anyhow::Result<()> {
        let ctx = context
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        match level {
            ProgressLevel::Debug => tracing::debug!(context = %ctx, "{}", message),
            ProgressLevel::Info => tracing::info!(context = %ctx, "{}", message),
            ProgressLevel::Warn => tracing::warn!(context = %ctx, "{}", message),
            ProgressLevel::Error => tracing::error!(context = %ctx, "{}", message),
        }

        Ok(())
    }
}
