use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use vidcrawl::config::DedupStrategy;
use vidcrawl::crawl_engine::{BloomFilter, DedupFilter, ExpiringSet};

#[test]
fn first_sighting_owns_the_url() {
    let filter = DedupFilter::from_strategy(DedupStrategy::Expiring {
        ttl: Duration::from_secs(60),
    });

    assert!(filter.test_and_set("http://site/a"));
    assert!(!filter.test_and_set("http://site/a"));
    assert!(filter.test_and_set("http://site/b"));
    assert_eq!(filter.len(), 2);
    assert_eq!(filter.purge_interval(), Some(Duration::from_secs(60)));
}

#[test]
fn purge_forgets_only_expired_entries() {
    let set = ExpiringSet::new(Duration::from_millis(30));
    set.test_and_set("http://site/old");
    std::thread::sleep(Duration::from_millis(50));
    set.test_and_set("http://site/new");

    assert_eq!(set.purge_expired(), 1);
    assert_eq!(set.len(), 1);
    assert!(!set.test_and_set("http://site/new"));
}

#[test]
fn concurrent_exact_dedup_admits_each_url_once() {
    let filter = Arc::new(DedupFilter::from_strategy(DedupStrategy::Expiring {
        ttl: Duration::from_secs(60),
    }));
    let winners = Arc::new(AtomicUsize::new(0));

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let filter = Arc::clone(&filter);
            let winners = Arc::clone(&winners);
            std::thread::spawn(move || {
                for n in 0..500 {
                    if filter.test_and_set(&format!("http://site/{n}")) {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().expect("no panic");
    }

    assert_eq!(winners.load(Ordering::SeqCst), 500);
}

#[test]
fn bloom_filter_never_admits_a_repeat() {
    let bloom = BloomFilter::with_rate(1_000, 0.01);
    for n in 0..1_000 {
        bloom.test_and_set(format!("http://site/{n}").as_bytes());
    }
    for n in 0..1_000 {
        let url = format!("http://site/{n}");
        assert!(bloom.contains(url.as_bytes()));
        assert!(!bloom.test_and_set(url.as_bytes()));
    }
    assert_eq!(
        DedupFilter::from_strategy(DedupStrategy::Probabilistic {
            expected_items: 10,
            false_positive_rate: 0.01,
        })
        .purge_interval(),
        None
    );
}

#[test]
fn bloom_false_positive_rate_stays_near_target() {
    let bloom = BloomFilter::with_rate(10_000, 0.01);
    for n in 0..10_000 {
        bloom.test_and_set(format!("http://site/seen/{n}").as_bytes());
    }

    let false_positives = (0..10_000)
        .filter(|n| bloom.contains(format!("http://site/unseen/{n}").as_bytes()))
        .count();

    // 1% target, generous margin for hash variance
    assert!(
        false_positives < 300,
        "{false_positives} false positives out of 10000"
    );
}
