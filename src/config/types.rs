//! Core configuration types for a crawl run

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The termination driver of a crawl. Exactly one is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlBudget {
    /// Follow links at most this many hops from the seed; the seed itself counts
    /// as the first hop, so `Depth(1)` fetches only the seed
    Depth(u32),
    /// Stop after this many successful page fetches
    Limit(usize),
}

impl CrawlBudget {
    /// Depth carried by the seed task
    #[must_use]
    pub fn seed_depth(&self) -> Option<u32> {
        match self {
            Self::Depth(depth) => Some(*depth),
            Self::Limit(_) => None,
        }
    }

    /// Global fetch limit, if limit mode is active
    #[must_use]
    pub fn fetch_limit(&self) -> Option<usize> {
        match self {
            Self::Depth(_) => None,
            Self::Limit(limit) => Some(*limit),
        }
    }
}

/// Membership semantics of the seen-URL filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Exact set whose entries are forgotten after `ttl`
    Expiring { ttl: Duration },
    /// Fixed-size Bloom filter sized for `expected_items` at `false_positive_rate`
    Probabilistic {
        expected_items: usize,
        false_positive_rate: f64,
    },
}

/// Where video metadata comes from
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSourceConfig {
    /// Scrape the fetched watch page
    PageScrape,
    /// Ask the YouTube Data API; `endpoint` overrides the public API root
    DataApi {
        #[serde(skip_serializing)]
        api_key: String,
        endpoint: Option<String>,
    },
}

impl std::fmt::Debug for MetadataSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageScrape => f.write_str("PageScrape"),
            Self::DataApi { endpoint, .. } => f
                .debug_struct("DataApi")
                .field("api_key", &"<redacted>")
                .field("endpoint", endpoint)
                .finish(),
        }
    }
}

/// Validated configuration of one crawl run. Build it with [`CrawlConfig::builder`].
#[derive(Debug, Clone, Serialize)]
pub struct CrawlConfig {
    /// Always an absolute http(s) URL (normalized in the builder)
    pub(crate) seed_url: String,
    pub(crate) budget: CrawlBudget,

    /// Throttle permits: fetch operations allowed in flight at once
    pub(crate) concurrency: usize,
    /// Worker tasks pulling from the frontier
    pub(crate) workers: usize,

    pub(crate) include_pattern: String,
    /// Compiled `include_pattern`, compiled once at build time
    #[serde(skip)]
    pub(crate) include_regex: Regex,

    pub(crate) frontier_capacity: usize,
    /// Queue fill ratio at which the periodic sweep applies the overflow policy
    pub(crate) overflow_high_water: f64,
    pub(crate) sweep_interval: Duration,

    pub(crate) dedup: DedupStrategy,

    pub(crate) fetch_timeout_secs: u64,
    pub(crate) max_body_bytes: usize,
    pub(crate) user_agent: String,

    pub(crate) metadata_source: MetadataSourceConfig,
    pub(crate) event_bus_capacity: usize,
    pub(crate) stats_interval: Duration,
}
