//! Event bus configuration

use std::time::Duration;

use crate::utils::DEFAULT_EVENT_BUS_CAPACITY;

/// What a publish does when the channel holds `capacity` unread events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackpressureMode {
    /// Overwrite the oldest unread event; lagging receivers see `ReceiverLagged`
    #[default]
    DropOldest,
    /// Wait for a free slot. A slow consumer slows the crawl down through this path
    Block,
    /// Fail with `ChannelFull`
    Error,
}

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    pub capacity: usize,
    pub backpressure_mode: BackpressureMode,
    /// Longest a `Block` publish waits for a free slot
    pub publish_timeout: Duration,
    /// Time subscribers get to drain after the `Shutdown` event
    pub drain_grace: Duration,
}

impl EventBusConfig {
    /// Blocking backpressure: no discovered video is overwritten before the sink
    /// has read it
    #[must_use]
    pub fn for_crawl(capacity: usize) -> Self {
        Self {
            capacity,
            backpressure_mode: BackpressureMode::Block,
            ..Self::default()
        }
    }
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_BUS_CAPACITY,
            backpressure_mode: BackpressureMode::DropOldest,
            publish_timeout: Duration::from_secs(30),
            drain_grace: Duration::from_millis(500),
        }
    }
}
