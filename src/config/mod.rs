//! Crawl configuration
//!
//! `CrawlConfig` and its type-safe builder. Every setting is validated once, at
//! build time; a configuration that builds is safe to crawl with.

pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

pub use builder::{Complete, CrawlConfigBuilder, WithSeedUrl, default_probabilistic_dedup};
pub use types::{CrawlBudget, CrawlConfig, DedupStrategy, MetadataSourceConfig};
