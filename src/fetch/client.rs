//! HTTP client construction and response classification
//!
//! This module builds the blocking-GET-capable client used by the cached
//! fetch layer and the sitemap parser, and maps transport/protocol failures
//! into the engine's error taxonomy. Timeout and connection failures must be
//! distinguishable from protocol-status failures so the retry policy can
//! classify them.

use crate::config::UserAgentConfig;
use crate::fetch::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Body markers that identify a challenge/block page
///
/// Only the detection signal is in scope; there is no evasion here. A block
/// must halt the run immediately rather than retry-looping.
const BLOCK_MARKERS: &[&str] = &[
    "Just a moment",
    "Attention Required",
    "cf-challenge",
    "challenge-platform",
    "_cf_chl_opt",
    "Verifying you are human",
];

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `platform` - The platform this client will index (included in the UA)
/// * `timeout` - Total request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    platform: &str,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: IndexerName/Version (platform; +ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} ({}; +{}; {})",
        config.indexer_name, config.indexer_version, platform, config.contact_url,
        config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body as text
///
/// Responses are classified before the body is returned:
/// - transport timeouts and connection failures map to their own variants
/// - 403/503 responses carrying challenge markers map to `Blocked`
/// - any other non-2xx status maps to `Status`
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_transport_error(url, e))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| classify_transport_error(url, e))?;

    if is_block_page(status, &body) {
        return Err(FetchError::Blocked {
            url: url.to_string(),
        });
    }

    if !(200..300).contains(&status) {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(body)
}

/// Maps a reqwest transport failure into the engine's taxonomy
fn classify_transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Detects a challenge/block page from the status code and body
///
/// Block vendors serve challenges as 403 or 503; an ordinary 403/503
/// without challenge markers stays an ordinary status error.
pub fn is_block_page(status: u16, body: &str) -> bool {
    if status != 403 && status != 503 {
        return false;
    }

    BLOCK_MARKERS.iter().any(|marker| body.contains(marker))
}
