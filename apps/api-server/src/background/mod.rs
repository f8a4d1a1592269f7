//! Background processing.

pub mod scheduler;

pub use scheduler::LifecycleScheduler;
