//! Background view tracking.

mod queue;

pub use queue::{ViewQueue, ViewQueueConfig};
