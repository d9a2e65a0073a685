//! Traffic counters for the video event bus

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::types::VideoEvent;

#[derive(Debug, Default)]
struct Counters {
    videos_published: AtomicU64,
    lifecycle_published: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
    backpressure_waits: AtomicU64,
    subscribers: AtomicUsize,
    peak_subscribers: AtomicUsize,
}

/// Shared handle to the bus counters. Clones observe the same counters.
#[derive(Debug, Clone, Default)]
pub struct EventBusMetrics {
    counters: Arc<Counters>,
}

impl EventBusMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_delivered(&self, was_video: bool, subscribers: usize) {
        let counter = if was_video {
            &self.counters.videos_published
        } else {
            &self.counters.lifecycle_published
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.observe_subscribers(subscribers);
    }

    /// Sent while nobody was subscribed
    pub(crate) fn record_dropped(&self) {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        self.observe_subscribers(0);
    }

    pub(crate) fn record_failed(&self) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A blocking publish found the channel full and had to wait
    pub(crate) fn record_backpressure_wait(&self) {
        self.counters.backpressure_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn observe_subscribers(&self, count: usize) {
        self.counters.subscribers.store(count, Ordering::Relaxed);
        self.counters.peak_subscribers.fetch_max(count, Ordering::Relaxed);
    }

    /// Point-in-time copy. Counters are read one by one, not as a unit.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = &self.counters;
        MetricsSnapshot {
            videos_published: c.videos_published.load(Ordering::Relaxed),
            lifecycle_published: c.lifecycle_published.load(Ordering::Relaxed),
            events_dropped: c.dropped.load(Ordering::Relaxed),
            events_failed: c.failed.load(Ordering::Relaxed),
            backpressure_waits: c.backpressure_waits.load(Ordering::Relaxed),
            subscribers: c.subscribers.load(Ordering::Relaxed),
            peak_subscribers: c.peak_subscribers.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// `VideoDiscovered` events handed to at least one subscriber
    pub videos_published: u64,
    /// Start, completion and shutdown events handed to at least one subscriber
    pub lifecycle_published: u64,
    pub events_dropped: u64,
    /// Publishes that timed out or found the channel full
    pub events_failed: u64,
    pub backpressure_waits: u64,
    pub subscribers: usize,
    pub peak_subscribers: usize,
}

impl MetricsSnapshot {
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.videos_published + self.lifecycle_published
    }
}

/// Classify an event before it is moved into the channel
pub(crate) fn is_video(event: &VideoEvent) -> bool {
    event.video().is_some()
}
