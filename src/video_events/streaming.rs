use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use super::errors::EventBusError;
use super::types::VideoEvent;

impl From<RecvError> for EventBusError {
    fn from(err: RecvError) -> Self {
        match err {
            RecvError::Closed => Self::Shutdown,
            RecvError::Lagged(missed) => Self::ReceiverLagged(missed),
        }
    }
}

/// A bus subscription that skips events the predicate rejects.
///
/// Rejected events are consumed, so they count as read for backpressure.
pub struct FilteredReceiver<F>
where
    F: Fn(&VideoEvent) -> bool + Send + Sync + 'static,
{
    inner: broadcast::Receiver<VideoEvent>,
    keep: F,
}

impl<F> FilteredReceiver<F>
where
    F: Fn(&VideoEvent) -> bool + Send + Sync + 'static,
{
    pub fn new(inner: broadcast::Receiver<VideoEvent>, keep: F) -> Self {
        Self { inner, keep }
    }

    /// # Errors
    /// `Shutdown` once every sender is gone; `ReceiverLagged` when events were
    /// overwritten before this receiver read them.
    pub async fn recv(&mut self) -> Result<VideoEvent, EventBusError> {
        loop {
            let event = self.inner.recv().await?;
            if (self.keep)(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-waiting variant; `Ok(None)` when no accepted event is buffered.
    ///
    /// # Errors
    /// As [`FilteredReceiver::recv`].
    pub fn try_recv(&mut self) -> Result<Option<VideoEvent>, EventBusError> {
        loop {
            let event = match self.inner.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(EventBusError::Shutdown),
                Err(TryRecvError::Lagged(missed)) => {
                    return Err(EventBusError::ReceiverLagged(missed));
                }
            };
            if (self.keep)(&event) {
                return Ok(Some(event));
            }
        }
    }
}
