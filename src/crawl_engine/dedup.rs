//! Seen-URL filters with an atomic check-and-set.
//!
//! [`DedupFilter::test_and_set`] returns `true` for exactly one caller per URL:
//! the caller that now owns the right to crawl it. Two variants exist:
//!
//! - [`ExpiringSet`]: exact membership, entries forgotten after a fixed window
//! - [`BloomFilter`]: fixed memory, no expiry, tolerates a configured rate of
//!   false positives (a never-seen URL reported as seen)

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::config::DedupStrategy;

/// Seen-URL filter selected by [`DedupStrategy`]
pub enum DedupFilter {
    Expiring(ExpiringSet),
    Bloom(BloomFilter),
}

impl DedupFilter {
    #[must_use]
    pub fn from_strategy(strategy: DedupStrategy) -> Self {
        match strategy {
            DedupStrategy::Expiring { ttl } => Self::Expiring(ExpiringSet::new(ttl)),
            DedupStrategy::Probabilistic {
                expected_items,
                false_positive_rate,
            } => Self::Bloom(BloomFilter::with_rate(expected_items, false_positive_rate)),
        }
    }

    /// Mark `url` as seen; `true` iff this call is the first to do so
    pub fn test_and_set(&self, url: &str) -> bool {
        match self {
            Self::Expiring(set) => set.test_and_set(url),
            Self::Bloom(bloom) => bloom.test_and_set(url.as_bytes()),
        }
    }

    /// Drop expired entries. A no-op for the Bloom variant.
    pub fn purge_expired(&self) -> usize {
        match self {
            Self::Expiring(set) => set.purge_expired(),
            Self::Bloom(_) => 0,
        }
    }

    /// How often `purge_expired` is worth calling, if ever
    #[must_use]
    pub fn purge_interval(&self) -> Option<Duration> {
        match self {
            Self::Expiring(set) => Some(set.ttl()),
            Self::Bloom(_) => None,
        }
    }

    /// Entries tracked (exact) or insertions accepted (Bloom)
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Expiring(set) => set.len(),
            Self::Bloom(bloom) => bloom.inserted(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact seen-set whose entries expire after `ttl`
pub struct ExpiringSet {
    entries: DashMap<String, Instant>,
    ttl: Duration,
}

impl ExpiringSet {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The shard lock held by the entry API makes check and set one step
    pub fn test_and_set(&self, url: &str) -> bool {
        let now = Instant::now();
        match self.entries.entry(url.to_string()) {
            Entry::Occupied(mut seen) => {
                if now.duration_since(*seen.get()) >= self.ttl {
                    seen.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        }
    }

    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, seen_at| seen_at.elapsed() < ttl);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(target: "vidcrawl::dedup", "Purged {purged} expired dedup entries");
        }
        purged
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const HASH_SEED_A: u64 = 0x517c_c1b7_2722_0a95;
const HASH_SEED_B: u64 = 0x9e37_79b1_85eb_ca87;

/// Bloom filter sized from an expected item count and false-positive rate.
///
/// Bit positions come from double hashing two seeded xxh3 values.
pub struct BloomFilter {
    words: Mutex<Vec<u64>>,
    bit_count: u64,
    hash_count: u32,
    inserted: AtomicUsize,
}

impl BloomFilter {
    /// Size the filter for `expected_items` at `false_positive_rate`:
    /// `m = -n ln p / (ln 2)^2` bits and `k = (m / n) ln 2` hashes.
    #[must_use]
    pub fn with_rate(expected_items: usize, false_positive_rate: f64) -> Self {
        let n = expected_items.max(1) as f64;
        let p = false_positive_rate.clamp(f64::MIN_POSITIVE, 0.5);
        let ln2 = std::f64::consts::LN_2;

        let bits = (-(n * p.ln()) / (ln2 * ln2)).ceil().max(64.0) as u64;
        let hash_count = ((bits as f64 / n) * ln2).round().clamp(1.0, 32.0) as u32;
        let word_count = bits.div_ceil(64) as usize;

        Self {
            words: Mutex::new(vec![0u64; word_count]),
            bit_count: word_count as u64 * 64,
            hash_count,
            inserted: AtomicUsize::new(0),
        }
    }

    /// Set every bit for `data`; `true` iff at least one bit was newly set.
    pub fn test_and_set(&self, data: &[u8]) -> bool {
        let h1 = xxh3_64_with_seed(data, HASH_SEED_A);
        let h2 = xxh3_64_with_seed(data, HASH_SEED_B) | 1;

        let mut words = self.words.lock();
        let mut newly_set = false;
        for i in 0..u64::from(self.hash_count) {
            let idx = h1.wrapping_add(i.wrapping_mul(h2)) % self.bit_count;
            let word = (idx / 64) as usize;
            let mask = 1u64 << (idx % 64);
            if words[word] & mask == 0 {
                words[word] |= mask;
                newly_set = true;
            }
        }
        drop(words);

        if newly_set {
            self.inserted.fetch_add(1, Ordering::Relaxed);
        }
        newly_set
    }

    /// Membership test without inserting
    #[must_use]
    pub fn contains(&self, data: &[u8]) -> bool {
        let h1 = xxh3_64_with_seed(data, HASH_SEED_A);
        let h2 = xxh3_64_with_seed(data, HASH_SEED_B) | 1;

        let words = self.words.lock();
        (0..u64::from(self.hash_count)).all(|i| {
            let idx = h1.wrapping_add(i.wrapping_mul(h2)) % self.bit_count;
            words[(idx / 64) as usize] & (1u64 << (idx % 64)) != 0
        })
    }

    #[must_use]
    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    #[must_use]
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    #[must_use]
    pub fn inserted(&self) -> usize {
        self.inserted.load(Ordering::Relaxed)
    }
}
