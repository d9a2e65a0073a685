//! Type-safe builder for `CrawlConfig` using the typestate pattern
//!
//! The seed URL and the crawl budget must be supplied, in that order, before
//! `build()` becomes available. Everything else has a default.

use crate::utils::{
    CRAWLER_USER_AGENT, DEFAULT_BLOOM_EXPECTED_ITEMS, DEFAULT_BLOOM_FP_RATE,
    DEFAULT_CONCURRENCY, DEFAULT_DEDUP_TTL, DEFAULT_EVENT_BUS_CAPACITY,
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_FRONTIER_CAPACITY, DEFAULT_INCLUDE_PATTERN,
    DEFAULT_MAX_BODY_BYTES, DEFAULT_OVERFLOW_HIGH_WATER, DEFAULT_STATS_INTERVAL,
    DEFAULT_SWEEP_INTERVAL, is_valid_url,
};
use anyhow::{Result, anyhow, bail};
use regex::Regex;
use std::marker::PhantomData;
use std::time::Duration;

use super::types::{CrawlBudget, CrawlConfig, DedupStrategy, MetadataSourceConfig};

// Type states for the builder
pub struct WithSeedUrl;
pub struct Complete;

pub struct CrawlConfigBuilder<State = ()> {
    pub(crate) seed_url: Option<String>,
    pub(crate) budget: Option<CrawlBudget>,
    pub(crate) concurrency: usize,
    pub(crate) workers: Option<usize>,
    pub(crate) include_pattern: String,
    pub(crate) frontier_capacity: usize,
    pub(crate) overflow_high_water: f64,
    pub(crate) sweep_interval: Duration,
    pub(crate) dedup: DedupStrategy,
    pub(crate) fetch_timeout_secs: u64,
    pub(crate) max_body_bytes: usize,
    pub(crate) user_agent: String,
    pub(crate) metadata_source: MetadataSourceConfig,
    pub(crate) event_bus_capacity: usize,
    pub(crate) stats_interval: Duration,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CrawlConfigBuilder<()> {
    fn default() -> Self {
        Self {
            seed_url: None,
            budget: None,
            concurrency: DEFAULT_CONCURRENCY,
            workers: None,
            include_pattern: DEFAULT_INCLUDE_PATTERN.to_string(),
            frontier_capacity: DEFAULT_FRONTIER_CAPACITY,
            overflow_high_water: DEFAULT_OVERFLOW_HIGH_WATER,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            dedup: DedupStrategy::Expiring {
                ttl: DEFAULT_DEDUP_TTL,
            },
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            user_agent: CRAWLER_USER_AGENT.to_string(),
            metadata_source: MetadataSourceConfig::PageScrape,
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
            stats_interval: DEFAULT_STATS_INTERVAL,
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfig {
    /// Create a builder for configuring a `CrawlConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlConfigBuilder<()> {
        CrawlConfigBuilder::default()
    }
}

impl<State> CrawlConfigBuilder<State> {
    fn into_state<Next>(self) -> CrawlConfigBuilder<Next> {
        CrawlConfigBuilder {
            seed_url: self.seed_url,
            budget: self.budget,
            concurrency: self.concurrency,
            workers: self.workers,
            include_pattern: self.include_pattern,
            frontier_capacity: self.frontier_capacity,
            overflow_high_water: self.overflow_high_water,
            sweep_interval: self.sweep_interval,
            dedup: self.dedup,
            fetch_timeout_secs: self.fetch_timeout_secs,
            max_body_bytes: self.max_body_bytes,
            user_agent: self.user_agent,
            metadata_source: self.metadata_source,
            event_bus_capacity: self.event_bus_capacity,
            stats_interval: self.stats_interval,
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfigBuilder<()> {
    pub fn seed_url(mut self, url: impl Into<String>) -> CrawlConfigBuilder<WithSeedUrl> {
        let url_string = url.into().trim().to_string();

        // Normalize URL: add https:// if no scheme is present
        let normalized_url = if url_string.is_empty()
            || url_string.starts_with("http://")
            || url_string.starts_with("https://")
        {
            url_string
        } else {
            format!("https://{url_string}")
        };

        self.seed_url = Some(normalized_url);
        self.into_state()
    }
}

impl CrawlConfigBuilder<WithSeedUrl> {
    pub fn budget(mut self, budget: CrawlBudget) -> CrawlConfigBuilder<Complete> {
        self.budget = Some(budget);
        self.into_state()
    }

    /// Shorthand for `budget(CrawlBudget::Depth(depth))`
    pub fn depth(self, depth: u32) -> CrawlConfigBuilder<Complete> {
        self.budget(CrawlBudget::Depth(depth))
    }

    /// Shorthand for `budget(CrawlBudget::Limit(limit))`
    pub fn limit(self, limit: usize) -> CrawlConfigBuilder<Complete> {
        self.budget(CrawlBudget::Limit(limit))
    }
}

// Build method only available when all required fields are set
impl CrawlConfigBuilder<Complete> {
    /// Validate every setting and produce the configuration.
    ///
    /// # Errors
    /// Any invalid setting is a configuration error: the crawl must not start.
    pub fn build(self) -> Result<CrawlConfig> {
        let seed_url = self
            .seed_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow!("seed_url is required"))?;
        if !is_valid_url(&seed_url) {
            bail!("seed_url '{seed_url}' is not an absolute http(s) URL");
        }

        let budget = self
            .budget
            .ok_or_else(|| anyhow!("a crawl budget (depth or limit) is required"))?;
        match budget {
            CrawlBudget::Depth(0) => bail!("crawl depth must be a positive integer"),
            CrawlBudget::Limit(0) => bail!("crawl limit must be a positive integer"),
            _ => {}
        }

        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        let workers = self.workers.unwrap_or(self.concurrency);
        if workers == 0 {
            bail!("workers must be at least 1");
        }

        // Halving a one-slot queue would never free room
        if self.frontier_capacity < 2 {
            bail!(
                "frontier_capacity must be at least 2 (got {})",
                self.frontier_capacity
            );
        }
        if !(self.overflow_high_water > 0.0 && self.overflow_high_water <= 1.0) {
            bail!(
                "overflow_high_water must be in (0, 1] (got {})",
                self.overflow_high_water
            );
        }
        if self.sweep_interval.is_zero() || self.stats_interval.is_zero() {
            bail!("sweep and stats intervals must be non-zero");
        }

        let include_regex = Regex::new(&self.include_pattern)
            .map_err(|e| anyhow!("Invalid inclusion pattern '{}': {e}", self.include_pattern))?;

        match self.dedup {
            DedupStrategy::Expiring { ttl } if ttl.is_zero() => {
                bail!("dedup expiry window must be non-zero")
            }
            DedupStrategy::Probabilistic {
                expected_items,
                false_positive_rate,
            } => {
                if expected_items == 0 {
                    bail!("bloom filter expected_items must be at least 1");
                }
                if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
                    bail!("bloom filter false_positive_rate must be in (0, 1) (got {false_positive_rate})");
                }
            }
            DedupStrategy::Expiring { .. } => {}
        }

        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be at least 1");
        }
        if self.max_body_bytes == 0 {
            bail!("max_body_bytes must be at least 1");
        }
        if self.event_bus_capacity == 0 {
            bail!("event_bus_capacity must be at least 1");
        }
        if let MetadataSourceConfig::DataApi { api_key, .. } = &self.metadata_source
            && api_key.trim().is_empty()
        {
            bail!("the video data API needs a non-empty API key");
        }

        Ok(CrawlConfig {
            seed_url,
            budget,
            concurrency: self.concurrency,
            workers,
            include_pattern: self.include_pattern,
            include_regex,
            frontier_capacity: self.frontier_capacity,
            overflow_high_water: self.overflow_high_water,
            sweep_interval: self.sweep_interval,
            dedup: self.dedup,
            fetch_timeout_secs: self.fetch_timeout_secs,
            max_body_bytes: self.max_body_bytes,
            user_agent: self.user_agent,
            metadata_source: self.metadata_source,
            event_bus_capacity: self.event_bus_capacity,
            stats_interval: self.stats_interval,
        })
    }
}

/// Bloom filter strategy with the stock sizing
#[must_use]
pub fn default_probabilistic_dedup() -> DedupStrategy {
    DedupStrategy::Probabilistic {
        expected_items: DEFAULT_BLOOM_EXPECTED_ITEMS,
        false_positive_rate: DEFAULT_BLOOM_FP_RATE,
    }
}
