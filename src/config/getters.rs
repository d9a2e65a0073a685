//! Getter methods for `CrawlConfig`

use std::time::Duration;

use regex::Regex;

use super::types::{CrawlBudget, CrawlConfig, DedupStrategy, MetadataSourceConfig};

impl CrawlConfig {
    #[must_use]
    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    #[must_use]
    pub fn budget(&self) -> CrawlBudget {
        self.budget
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn include_pattern(&self) -> &str {
        &self.include_pattern
    }

    #[must_use]
    pub fn include_regex(&self) -> &Regex {
        &self.include_regex
    }

    /// Whether `url` passes the inclusion pattern
    #[must_use]
    pub fn includes(&self, url: &str) -> bool {
        self.include_regex.is_match(url)
    }

    #[must_use]
    pub fn frontier_capacity(&self) -> usize {
        self.frontier_capacity
    }

    #[must_use]
    pub fn overflow_high_water(&self) -> f64 {
        self.overflow_high_water
    }

    /// Queue length at which the periodic sweep applies the overflow policy
    #[must_use]
    pub fn overflow_high_water_len(&self) -> usize {
        let mark = (self.frontier_capacity as f64 * self.overflow_high_water).ceil() as usize;
        mark.clamp(1, self.frontier_capacity)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    #[must_use]
    pub fn dedup(&self) -> DedupStrategy {
        self.dedup
    }

    #[must_use]
    pub fn fetch_timeout_secs(&self) -> u64 {
        self.fetch_timeout_secs
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn metadata_source(&self) -> &MetadataSourceConfig {
        &self.metadata_source
    }

    #[must_use]
    pub fn event_bus_capacity(&self) -> usize {
        self.event_bus_capacity
    }

    #[must_use]
    pub fn stats_interval(&self) -> Duration {
        self.stats_interval
    }
}
