use super::core::VideoEventBus;

impl VideoEventBus {
    /// Single line for the periodic stats log
    #[must_use]
    pub fn metrics_report(&self) -> String {
        let m = self.shared.metrics.snapshot();
        format!(
            "videos={} lifecycle={} dropped={} failed={} waits={} subscribers={}/{} buffered={}",
            m.videos_published,
            m.lifecycle_published,
            m.events_dropped,
            m.events_failed,
            m.backpressure_waits,
            m.subscribers,
            m.peak_subscribers,
            self.buffer_len(),
        )
    }
}
