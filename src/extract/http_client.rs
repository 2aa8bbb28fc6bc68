//! Shared HTTP client construction policy for extractors.
//!
//! Centralizes networking defaults so all extractors stay consistent on
//! timeouts, user-agent, compression, and cookie support. One client is
//! built per [`Summarizer`](crate::orchestrator::Summarizer) and reused
//! across requests for connection pooling.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::cookie::Jar;

use crate::error::SummaryError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Desktop browser user-agent required by the BiliBili API, which rejects
/// default and mobile agents.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Builds the shared extractor HTTP client.
///
/// Redirects are followed (required for `b23.tv` short-link resolution)
/// and a cookie jar is attached when provided so redirect chains that set
/// session cookies keep working.
///
/// # Errors
///
/// Returns [`SummaryError::NoInternet`] when client construction fails,
/// which only happens when the TLS backend cannot initialize.
pub fn build_extractor_http_client(cookie_jar: Option<Arc<Jar>>) -> Result<Client, SummaryError> {
    let mut builder = Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .user_agent(DESKTOP_USER_AGENT)
        .gzip(true);

    if let Some(jar) = cookie_jar {
        builder = builder.cookie_provider(jar);
    }

    builder.build().map_err(|error| {
        tracing::error!(error = %error, "HTTP client construction failed");
        SummaryError::NoInternet
    })
}
