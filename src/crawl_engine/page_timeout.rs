//! Timeout wrapper for page fetches
//!
//! Bounds a fetch regardless of what the fetcher does internally, so one
//! unresponsive host cannot hold a throttle permit indefinitely.

use std::future::Future;
use std::time::Duration;

use super::crawl_types::FetchError;

/// Run `operation`, failing with `FetchError::Timeout` after `timeout`
///
/// # Errors
/// The operation's own error, or `Timeout` if the deadline passed first.
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration, url: &str) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
            timeout,
        }),
    }
}
