use std::sync::atomic::Ordering;

use crate::video_events::types::{ShutdownReason, VideoEvent};

use super::core::VideoEventBus;

impl VideoEventBus {
    /// Mark the bus closed and wake `wait_for_shutdown` callers. Idempotent and
    /// shared by all clones.
    pub fn shutdown(&self) {
        if !self.shared.closed.swap(true, Ordering::SeqCst) {
            log::debug!(target: "vidcrawl::events", "Event bus closed");
        }
        self.shared.closed_notify.notify_waiters();
    }

    pub async fn wait_for_shutdown(&self) {
        let closed = self.shared.closed_notify.notified();
        tokio::pin!(closed);
        closed.as_mut().enable();
        if self.is_shutdown() {
            return;
        }
        closed.await;
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// End the stream once the crawl has stopped.
    ///
    /// The `Shutdown` event goes through backpressure so videos still buffered
    /// are not overwritten by it. Subscribers then get `drain_grace` to read
    /// what is left before waiters are woken.
    pub async fn shutdown_gracefully(&self, reason: ShutdownReason) {
        log::info!(target: "vidcrawl::events", "Closing event stream: {reason:?}");

        let sent = self
            .publish_with_backpressure(VideoEvent::shutdown(reason))
            .await;
        self.shared.closed.store(true, Ordering::SeqCst);

        match sent {
            Ok(_) => tokio::time::sleep(self.shared.config.drain_grace).await,
            Err(e) => {
                log::debug!(target: "vidcrawl::events", "Shutdown event not delivered: {e}");
            }
        }

        self.shared.closed_notify.notify_waiters();
    }
}
