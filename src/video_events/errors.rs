/// Why a publish, receive or sink write on the video event bus failed
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    /// The event was sent while nobody was subscribed and is gone
    #[error("no subscriber is listening for video events")]
    NoSubscribers,

    /// A receiver fell behind a `DropOldest` bus and missed this many events
    #[error("subscriber fell behind and missed {0} events")]
    ReceiverLagged(u64),

    #[error("video event bus is shut down")]
    Shutdown,

    /// `Error` backpressure mode and no free slot
    #[error("video event channel is at capacity")]
    ChannelFull,

    /// `Block` backpressure mode waited `publish_timeout` without a free slot
    #[error("timed out waiting for room in the video event channel")]
    PublishTimeout,

    #[error("failed to encode video record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write video record: {0}")]
    Io(#[from] std::io::Error),
}
