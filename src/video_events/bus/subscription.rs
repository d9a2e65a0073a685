use tokio::sync::broadcast;

use crate::video_events::streaming::FilteredReceiver;
use crate::video_events::types::VideoEvent;

use super::core::VideoEventBus;

impl VideoEventBus {
    /// New receiver; sees only events published after this call
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<VideoEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let count = self.sender.receiver_count();
        self.shared.metrics.observe_subscribers(count);
        count
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }

    pub fn subscribe_filtered<F>(&self, filter: F) -> FilteredReceiver<F>
    where
        F: Fn(&VideoEvent) -> bool + Send + Sync + 'static,
    {
        FilteredReceiver::new(self.subscribe(), filter)
    }
}
