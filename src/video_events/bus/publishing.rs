use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::video_events::config::BackpressureMode;
use crate::video_events::errors::EventBusError;
use crate::video_events::metrics::is_video;
use crate::video_events::types::VideoEvent;

use super::core::VideoEventBus;

/// After this many `Block` timeouts in a row, publishes stop waiting
const BLOCK_TIMEOUT_BREAKER: usize = 10;

/// Receivers give no signal when they catch up, so a blocked publish polls
const CAPACITY_POLL: Duration = Duration::from_millis(5);

impl VideoEventBus {
    /// Send to every current subscriber without waiting.
    ///
    /// # Errors
    /// `NoSubscribers` if nobody is listening; the event is lost.
    pub async fn publish(&self, event: VideoEvent) -> Result<usize, EventBusError> {
        self.send_now(event)
    }

    /// Send according to the configured [`BackpressureMode`].
    ///
    /// # Errors
    /// `NoSubscribers` in every mode. `ChannelFull` in `Error` mode.
    /// `PublishTimeout` or `Shutdown` in `Block` mode.
    pub async fn publish_with_backpressure(
        &self,
        event: VideoEvent,
    ) -> Result<usize, EventBusError> {
        match self.shared.config.backpressure_mode {
            BackpressureMode::DropOldest => self.send_now(event),
            BackpressureMode::Block => self.publish_blocking(event).await,
            BackpressureMode::Error => {
                let _guard = self.shared.send_lock.lock().await;
                if self.is_full() {
                    self.shared.metrics.record_failed();
                    return Err(EventBusError::ChannelFull);
                }
                self.send_now(event)
            }
        }
    }

    async fn publish_blocking(&self, event: VideoEvent) -> Result<usize, EventBusError> {
        let timeouts = self.shared.consecutive_timeouts.load(Ordering::Acquire);
        if timeouts > BLOCK_TIMEOUT_BREAKER {
            if self.is_full() {
                log::warn!(
                    target: "vidcrawl::events",
                    "{timeouts} publish timeouts in a row, sending without waiting for the consumer"
                );
                return self.send_now(event);
            }
            // Consumer caught up: wait for it again
            self.shared.consecutive_timeouts.store(0, Ordering::Release);
            log::info!(target: "vidcrawl::events", "Event consumer recovered, blocking publishes resumed");
        }

        let wait_for_room = async {
            if self.is_full() {
                self.shared.metrics.record_backpressure_wait();
            }
            while self.is_full() {
                if self.is_shutdown() {
                    return Err(EventBusError::Shutdown);
                }
                tokio::time::sleep(CAPACITY_POLL).await;
            }
            Ok(())
        };

        match tokio::time::timeout(self.shared.config.publish_timeout, wait_for_room).await {
            Ok(Ok(())) => {
                self.shared.consecutive_timeouts.store(0, Ordering::Release);
                self.send_now(event)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                let count = self.shared.consecutive_timeouts.fetch_add(1, Ordering::AcqRel) + 1;
                log::warn!(
                    target: "vidcrawl::events",
                    "Consumer stalled: publish timeout #{count} after {:?}",
                    self.shared.config.publish_timeout
                );
                self.shared.metrics.record_failed();
                Err(EventBusError::PublishTimeout)
            }
        }
    }

    fn send_now(&self, event: VideoEvent) -> Result<usize, EventBusError> {
        let video = is_video(&event);
        match self.sender.send(event) {
            Ok(subscribers) => {
                self.shared.metrics.record_delivered(video, subscribers);
                Ok(subscribers)
            }
            Err(_) => {
                self.shared.metrics.record_dropped();
                log::trace!(target: "vidcrawl::events", "Event dropped, no subscribers");
                Err(EventBusError::NoSubscribers)
            }
        }
    }
}
