//! Shared configuration constants for vidcrawl
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

use std::time::Duration;

/// Default number of concurrently in-flight crawl operations
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default frontier capacity: 100,000 queued URLs
///
/// At roughly 100 bytes per URL this is ~10 MB of queued work before the
/// overflow policy starts discarding the oldest half of the queue.
pub const DEFAULT_FRONTIER_CAPACITY: usize = 100_000;

/// Inclusion regex that accepts every URL
pub const DEFAULT_INCLUDE_PATTERN: &str = "^.*$";

/// Time-to-live for entries in the exact dedup set
pub const DEFAULT_DEDUP_TTL: Duration = Duration::from_secs(5 * 60);

/// Expected number of distinct URLs when sizing a Bloom filter
pub const DEFAULT_BLOOM_EXPECTED_ITEMS: usize = 1_000_000;

/// Target false-positive rate when sizing a Bloom filter
pub const DEFAULT_BLOOM_FP_RATE: f64 = 0.01;

/// Per-request fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Upper bound on the number of body bytes read from a single page
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Interval between frontier overflow sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Occupancy ratio at which the periodic sweep sheds the oldest half of the frontier
pub const DEFAULT_OVERFLOW_HIGH_WATER: f64 = 0.9;

/// Interval between crawl statistics log lines
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(10);

/// Capacity of the outbound video event channel
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1000;

/// Base URL of the YouTube Data API v3
pub const YOUTUBE_API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3";

/// User agent sent with every page fetch
pub const CRAWLER_USER_AGENT: &str =
    "vidcrawl/0.3 (+https://github.com/vidcrawl/vidcrawl; video discovery crawler)";
