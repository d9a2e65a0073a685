//! Page fetching
//!
//! [`Fetcher`] is the seam between the crawl engine and the network. The engine
//! only needs the page body; link extraction and metadata lookup both work from
//! it, so each page is fetched once.

use futures::StreamExt;
use log::trace;
use reqwest::Client;
use reqwest::redirect::Policy;
use std::future::Future;
use std::time::Duration;

use super::crawl_types::FetchError;
use crate::config::CrawlConfig;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub body: String,
}

pub trait Fetcher: Send + Sync {
    /// GET `url`. Non-2xx responses are errors.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// reqwest-backed fetcher with a per-request timeout and a body size cap
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        max_body_bytes: usize,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .redirect(Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &CrawlConfig) -> Result<Self, FetchError> {
        Self::new(
            config.user_agent(),
            config.fetch_timeout(),
            config.max_body_bytes(),
        )
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed =
            url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5")
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        // Reject before downloading when the server announces an oversized body
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > self.max_body_bytes as u64 {
            return Err(FetchError::BodyTooLarge {
                url: final_url,
                limit: self.max_body_bytes,
            });
        }

        let mut buffer = Vec::with_capacity(expected_size as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if buffer.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::BodyTooLarge {
                    url: final_url,
                    limit: self.max_body_bytes,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        trace!(target: "vidcrawl::fetch", "Fetched {} bytes from {final_url}", buffer.len());

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body: String::from_utf8_lossy(&buffer).into_owned(),
        })
    }
}
