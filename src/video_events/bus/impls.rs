use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::video_events::config::EventBusConfig;

use super::core::VideoEventBus;

impl Default for VideoEventBus {
    fn default() -> Self {
        Self::with_config(EventBusConfig::default())
    }
}

impl Clone for VideoEventBus {
    fn clone(&self) -> Self {
        self.shared.handles.fetch_add(1, Ordering::Relaxed);
        Self {
            sender: self.sender.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for VideoEventBus {
    fn drop(&mut self) {
        if self.shared.handles.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.closed.store(true, Ordering::SeqCst);
            self.shared.closed_notify.notify_waiters();
            log::trace!(target: "vidcrawl::events", "Last event bus handle dropped");
        }
    }
}
