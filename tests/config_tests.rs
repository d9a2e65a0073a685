//! Tests for the type-safe configuration builder

use std::time::Duration;
use vidcrawl::config::{CrawlBudget, CrawlConfig, DedupStrategy, MetadataSourceConfig};

#[test]
fn builder_defaults() {
    // CrawlConfig::builder().build() and CrawlConfig::builder().seed_url(..).build()
    // do not compile: seed URL and budget are required by the type state
    let config = CrawlConfig::builder()
        .seed_url("https://example.com")
        .depth(3)
        .build()
        .unwrap();

    assert_eq!(config.seed_url(), "https://example.com");
    assert_eq!(config.budget(), CrawlBudget::Depth(3));
    assert_eq!(config.concurrency(), 10);
    assert_eq!(config.workers(), 10);
    assert_eq!(config.include_pattern(), "^.*$");
    assert_eq!(config.frontier_capacity(), 100_000);
    assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
    assert_eq!(
        config.dedup(),
        DedupStrategy::Expiring {
            ttl: Duration::from_secs(300)
        }
    );
    assert_eq!(config.metadata_source(), &MetadataSourceConfig::PageScrape);
}

#[test]
fn seed_without_scheme_gets_https() {
    let config = CrawlConfig::builder()
        .seed_url("  example.com/videos ")
        .limit(5)
        .build()
        .unwrap();
    assert_eq!(config.seed_url(), "https://example.com/videos");
    assert_eq!(config.budget(), CrawlBudget::Limit(5));
}

#[test]
fn workers_follow_concurrency_unless_set() {
    let config = CrawlConfig::builder()
        .seed_url("http://example.com")
        .depth(1)
        .concurrency(4)
        .build()
        .unwrap();
    assert_eq!(config.workers(), 4);

    let config = CrawlConfig::builder()
        .seed_url("http://example.com")
        .depth(1)
        .concurrency(4)
        .workers(16)
        .build()
        .unwrap();
    assert_eq!(config.workers(), 16);
}

#[test]
fn invalid_settings_are_rejected() {
    let base = || CrawlConfig::builder().seed_url("http://example.com");

    assert!(CrawlConfig::builder().seed_url("").depth(1).build().is_err());
    assert!(CrawlConfig::builder().seed_url("http://").depth(1).build().is_err());
    assert!(base().depth(0).build().is_err());
    assert!(base().limit(0).build().is_err());
    assert!(base().depth(1).concurrency(0).build().is_err());
    assert!(base().depth(1).workers(0).build().is_err());
    assert!(base().depth(1).frontier_capacity(1).build().is_err());
    assert!(base().depth(1).include_pattern("([").build().is_err());
    assert!(base().depth(1).overflow_high_water(0.0).build().is_err());
    assert!(base().depth(1).overflow_high_water(1.5).build().is_err());
    assert!(base().depth(1).fetch_timeout_secs(0).build().is_err());
    assert!(
        base()
            .depth(1)
            .dedup(DedupStrategy::Probabilistic {
                expected_items: 100,
                false_positive_rate: 1.0,
            })
            .build()
            .is_err()
    );
    assert!(
        base()
            .depth(1)
            .dedup(DedupStrategy::Expiring {
                ttl: Duration::ZERO
            })
            .build()
            .is_err()
    );
    assert!(base().depth(1).youtube_api_key("   ").build().is_err());
}

#[test]
fn inclusion_regex_is_applied() {
    let config = CrawlConfig::builder()
        .seed_url("http://site/a")
        .depth(2)
        .include_pattern(r"^http://site/")
        .build()
        .unwrap();

    assert!(config.includes("http://site/b"));
    assert!(!config.includes("http://external/c"));
}

#[test]
fn high_water_length_is_clamped_to_capacity() {
    let config = CrawlConfig::builder()
        .seed_url("http://example.com")
        .depth(1)
        .frontier_capacity(10)
        .overflow_high_water(0.9)
        .build()
        .unwrap();
    assert_eq!(config.overflow_high_water_len(), 9);

    let config = CrawlConfig::builder()
        .seed_url("http://example.com")
        .depth(1)
        .frontier_capacity(2)
        .overflow_high_water(0.01)
        .build()
        .unwrap();
    assert_eq!(config.overflow_high_water_len(), 1);
}

#[test]
fn api_key_is_not_serialized_or_printed() {
    let config = CrawlConfig::builder()
        .seed_url("http://example.com")
        .depth(1)
        .youtube_api_key("secret-key")
        .build()
        .unwrap();

    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains("secret-key"));
    assert!(!format!("{config:?}").contains("secret-key"));
}
