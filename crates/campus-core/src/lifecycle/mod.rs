//! Background lifecycle jobs: reaping expired stories and moving old post
//! media to the archive tier.
//!
//! Each job is a function of the current time and datastore state. Item
//! failures are logged and counted, never propagated out of a sweep.

mod archival;
mod expiry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::error::RepoError;

pub use archival::PostArchivalSweep;
pub use expiry::StoryExpiryReaper;

/// Timing limits applied to a single sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// After this long the sweep stops picking up new items.
    pub soft_timeout: Duration,
    /// Upper bound for each media store call.
    pub media_op_timeout: Duration,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            soft_timeout: Duration::from_secs(600),
            media_op_timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped_due_to_timeout: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("previous run of {0} is still in progress")]
    AlreadyRunning(&'static str),

    #[error("failed to load sweep items: {0}")]
    Repo(#[from] RepoError),
}

/// Marks a job as running for as long as the guard lives.
pub(crate) struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let first = RunGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(RunGuard::acquire(&flag).is_none());
        drop(first);
        assert!(RunGuard::acquire(&flag).is_some());
    }
}
