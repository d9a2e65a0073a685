//! Outbound stream of discovered videos
//!
//! The crawl publishes [`VideoEvent`]s onto a [`VideoEventBus`]; downstream consumers
//! subscribe to it. [`JsonLinesPublisher`] is the stock consumer that serializes every
//! discovered video to a writer.

pub mod bus;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod publisher;
pub mod streaming;
pub mod types;

pub use bus::VideoEventBus;
pub use config::{BackpressureMode, EventBusConfig};
pub use errors::EventBusError;
pub use metrics::{EventBusMetrics, MetricsSnapshot};
pub use publisher::JsonLinesPublisher;
pub use streaming::FilteredReceiver;
pub use types::{ShutdownReason, VideoEvent};
