//! Builder methods available for all states
//!
//! Optional settings can be applied at any point of the builder chain.

use std::time::Duration;

use super::builder::CrawlConfigBuilder;
use super::types::{DedupStrategy, MetadataSourceConfig};

impl<State> CrawlConfigBuilder<State> {
    /// Number of fetch operations allowed in flight at once (default 10)
    #[must_use]
    pub fn concurrency(mut self, permits: usize) -> Self {
        self.concurrency = permits;
        self
    }

    /// Number of worker tasks pulling from the frontier. Defaults to the
    /// concurrency level; more workers than permits only adds idle waiters.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Regular expression a discovered link must match to be crawled
    ///
    /// # Example
    /// ```rust
    /// # use vidcrawl::config::CrawlConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = CrawlConfig::builder()
    ///     .seed_url("https://www.youtube.com/watch?v=i8YRtIHRIv0")
    ///     .depth(3)
    ///     .include_pattern(r"^https://www\.youtube\.com/watch\?v=.*$")
    ///     .build()?;
    /// assert!(config.includes("https://www.youtube.com/watch?v=abc"));
    /// assert!(!config.includes("https://example.com/"));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn include_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.include_pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn frontier_capacity(mut self, capacity: usize) -> Self {
        self.frontier_capacity = capacity;
        self
    }

    /// Fill ratio (0, 1] at which the periodic sweep halves the frontier
    #[must_use]
    pub fn overflow_high_water(mut self, ratio: f64) -> Self {
        self.overflow_high_water = ratio;
        self
    }

    #[must_use]
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    #[must_use]
    pub fn dedup(mut self, strategy: DedupStrategy) -> Self {
        self.dedup = strategy;
        self
    }

    #[must_use]
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    /// Pages larger than this are abandoned as fetch failures
    #[must_use]
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn metadata_source(mut self, source: MetadataSourceConfig) -> Self {
        self.metadata_source = source;
        self
    }

    /// Resolve video metadata through the Data API instead of page scraping
    #[must_use]
    pub fn youtube_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.metadata_source = MetadataSourceConfig::DataApi {
            api_key: api_key.into(),
            endpoint: None,
        };
        self
    }

    #[must_use]
    pub fn event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = capacity;
        self
    }

    #[must_use]
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }
}
