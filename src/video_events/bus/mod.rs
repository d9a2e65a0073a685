//! The [`VideoEventBus`] and its operations, one concern per file

mod core;
mod impls;
mod metrics_reporting;
mod publishing;
mod shutdown;
mod subscription;

pub use self::core::VideoEventBus;
