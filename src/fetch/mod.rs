//! HTTP fetching stack
//!
//! This module contains everything between the orchestrator and the remote
//! platform:
//! - HTTP client construction and error classification
//! - Per-indexer rate limiting
//! - Fixed-delay retry with retryable/fatal classification
//! - A durable, best-effort fetch cache

mod cache;
mod client;
mod rate_limit;
mod retry;

pub use cache::FetchCache;
pub use client::{build_http_client, fetch_text, is_block_page};
pub use rate_limit::RateLimiter;
pub use retry::{with_retry, RetryPolicy};

use thiserror::Error;

/// Errors surfaced by the fetching stack
///
/// The variants mirror the engine's failure taxonomy: transient network
/// failures and upstream server errors are retryable; client errors, parse
/// failures, and anti-bot blocks are fatal for the candidate (or, for
/// blocks, the whole run).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Anti-bot challenge served by {url}")]
    Blocked { url: String },

    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Whether the retry policy may re-execute after this error
    ///
    /// Timeouts and connection failures are always retryable. Among
    /// protocol-level failures only server errors (5xx) and rate-limit
    /// signals (429) are retryable; other client errors, parse failures,
    /// and anti-bot blocks are fatal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Blocked { .. } | Self::Parse { .. } => false,
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
        }
    }

    /// Whether this error is an anti-bot block, which must halt the run
    /// instead of retry-looping against a wall
    pub fn is_block(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}
