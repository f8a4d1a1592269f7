use chrono::{DateTime, Utc};

/// Source of the current time. Injected so jobs and expiry checks are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
