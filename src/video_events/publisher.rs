//! JSON-lines sink for discovered videos

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::bus::VideoEventBus;
use super::errors::EventBusError;
use super::streaming::FilteredReceiver;
use super::types::VideoEvent;

type EventFilter = fn(&VideoEvent) -> bool;

fn videos_and_shutdown(event: &VideoEvent) -> bool {
    matches!(
        event,
        VideoEvent::VideoDiscovered { .. } | VideoEvent::Shutdown { .. }
    )
}

/// Writes every discovered video as one JSON object per line.
///
/// Subscribes on construction, so create it before the crawl starts publishing.
pub struct JsonLinesPublisher<W> {
    receiver: FilteredReceiver<EventFilter>,
    writer: W,
}

impl<W> JsonLinesPublisher<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(bus: &VideoEventBus, writer: W) -> Self {
        Self {
            receiver: bus.subscribe_filtered(videos_and_shutdown as EventFilter),
            writer,
        }
    }

    /// Consume the stream until a `Shutdown` event or until the bus is gone.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    /// Fails if a record cannot be serialized or the writer fails.
    pub async fn run(mut self) -> Result<usize, EventBusError> {
        let mut written = 0usize;

        loop {
            match self.receiver.recv().await {
                Ok(VideoEvent::VideoDiscovered { video, .. }) => {
                    let mut line = serde_json::to_vec(&video)?;
                    line.push(b'\n');
                    self.writer.write_all(&line).await?;
                    self.writer.flush().await?;
                    written += 1;
                }
                Ok(VideoEvent::Shutdown { reason, .. }) => {
                    log::debug!(target: "vidcrawl::events", "Publisher stopping: {reason:?}");
                    break;
                }
                Ok(_) => {}
                Err(EventBusError::ReceiverLagged(missed)) => {
                    log::warn!(
                        target: "vidcrawl::events",
                        "Publisher lagged behind, {missed} events lost"
                    );
                }
                Err(EventBusError::Shutdown) => break,
                Err(e) => return Err(e),
            }
        }

        self.writer.flush().await?;
        log::info!(target: "vidcrawl::events", "Publisher wrote {written} video records");
        Ok(written)
    }
}
