use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{RunGuard, SweepError, SweepOptions, SweepReport};
use crate::media::{MediaPathResolver, bounded};
use crate::ports::{Clock, MediaStore, StoryRepository};

const JOB_NAME: &str = "story_expiry_reaper";

/// Hourly job that permanently removes stories past their expiry.
///
/// Blob deletion is attempted first and its failures only logged; the row is
/// removed regardless, so an expired story never lingers in feeds.
pub struct StoryExpiryReaper {
    stories: Arc<dyn StoryRepository>,
    media: Arc<dyn MediaStore>,
    resolver: MediaPathResolver,
    clock: Arc<dyn Clock>,
    options: SweepOptions,
    running: AtomicBool,
}

impl StoryExpiryReaper {
    pub fn new(
        stories: Arc<dyn StoryRepository>,
        media: Arc<dyn MediaStore>,
        resolver: MediaPathResolver,
        clock: Arc<dyn Clock>,
        options: SweepOptions,
    ) -> Self {
        Self {
            stories,
            media,
            resolver,
            clock,
            options,
            running: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &'static str {
        JOB_NAME
    }

    /// Run a sweep at the clock's current time.
    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        self.run_once(self.clock.now()).await
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport, SweepError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!(job = JOB_NAME, "Previous run still in progress, skipping");
            return Err(SweepError::AlreadyRunning(JOB_NAME));
        };

        let started = Instant::now();
        let expired = self.stories.expired_stories(now).await?;
        let total = expired.len();
        info!(job = JOB_NAME, count = total, "Starting expired story cleanup");

        let mut report = SweepReport::default();
        for story in expired {
            if started.elapsed() >= self.options.soft_timeout {
                report.skipped_due_to_timeout = total - report.processed;
                warn!(
                    job = JOB_NAME,
                    remaining = report.skipped_due_to_timeout,
                    "Soft timeout reached, leaving remaining stories for the next run"
                );
                break;
            }
            report.processed += 1;

            for (kind, path) in self.resolver.resolve_all(&story.media) {
                let op = self.media.delete(&path);
                if let Err(e) = bounded(self.options.media_op_timeout, op).await {
                    warn!(
                        story_id = %story.story_id,
                        media = %kind,
                        path = %path,
                        error = %e,
                        "Failed to delete story blob, continuing"
                    );
                }
            }

            match self.stories.hard_delete_story(story.story_id).await {
                Ok(true) => {
                    debug!(
                        story_id = %story.story_id,
                        hours_expired = story.hours_expired,
                        "Deleted expired story"
                    );
                    report.succeeded += 1;
                }
                Ok(false) => {
                    debug!(story_id = %story.story_id, "Story already removed");
                    report.succeeded += 1;
                }
                Err(e) => {
                    warn!(story_id = %story.story_id, error = %e, "Failed to delete expired story");
                    report.failed += 1;
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            job = JOB_NAME,
            deleted = report.succeeded,
            failed = report.failed,
            skipped = report.skipped_due_to_timeout,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Expired story cleanup completed"
        );
        Ok(report)
    }
}
