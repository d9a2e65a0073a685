use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize};
use tokio::sync::{Mutex, Notify, broadcast};

use crate::video_events::config::EventBusConfig;
use crate::video_events::metrics::EventBusMetrics;
use crate::video_events::types::VideoEvent;

/// State shared by every clone of one bus
#[derive(Debug)]
pub(super) struct BusShared {
    pub(super) config: EventBusConfig,
    pub(super) metrics: EventBusMetrics,
    pub(super) closed: AtomicBool,
    pub(super) closed_notify: Notify,
    /// Serializes check-and-send in `Error` mode
    pub(super) send_lock: Mutex<()>,
    /// `Block` publishes that timed out in a row
    pub(super) consecutive_timeouts: AtomicUsize,
    /// Live handles; dropping the last one closes the bus
    pub(super) handles: AtomicUsize,
}

/// Broadcast channel carrying [`VideoEvent`]s from the crawl to its consumers.
///
/// Clones share one channel, one set of metrics and one shutdown signal.
#[derive(Debug)]
pub struct VideoEventBus {
    pub(super) sender: broadcast::Sender<VideoEvent>,
    pub(super) shared: Arc<BusShared>,
}

impl VideoEventBus {
    /// Default configuration with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_config(EventBusConfig {
            capacity,
            ..EventBusConfig::default()
        })
    }

    #[must_use]
    pub fn with_config(mut config: EventBusConfig) -> Self {
        config.capacity = config.capacity.max(1);
        let (sender, _) = broadcast::channel(config.capacity);

        Self {
            sender,
            shared: Arc::new(BusShared {
                config,
                metrics: EventBusMetrics::new(),
                closed: AtomicBool::new(false),
                closed_notify: Notify::new(),
                send_lock: Mutex::new(()),
                consecutive_timeouts: AtomicUsize::new(0),
                handles: AtomicUsize::new(1),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EventBusConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn metrics(&self) -> &EventBusMetrics {
        &self.shared.metrics
    }

    /// Events sent but not yet read by every subscriber
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.sender.len()
    }

    pub(super) fn is_full(&self) -> bool {
        self.sender.len() >= self.shared.config.capacity
    }
}
