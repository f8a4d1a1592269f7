use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{RunGuard, SweepError, SweepOptions, SweepReport};
use crate::media::{MediaPathResolver, bounded};
use crate::ports::{Clock, MediaStore, PostRepository};

const JOB_NAME: &str = "post_archival_sweep";

/// Daily job that moves media of old posts to the archive tier.
///
/// Archival is all-or-nothing per post: a post is marked archived only after
/// every one of its blobs moved.
pub struct PostArchivalSweep {
    posts: Arc<dyn PostRepository>,
    media: Arc<dyn MediaStore>,
    resolver: MediaPathResolver,
    clock: Arc<dyn Clock>,
    options: SweepOptions,
    running: AtomicBool,
}

impl PostArchivalSweep {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        media: Arc<dyn MediaStore>,
        resolver: MediaPathResolver,
        clock: Arc<dyn Clock>,
        options: SweepOptions,
    ) -> Self {
        Self {
            posts,
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

    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        self.run_once(self.clock.now()).await
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport, SweepError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!(job = JOB_NAME, "Previous run still in progress, skipping");
            return Err(SweepError::AlreadyRunning(JOB_NAME));
        };

        let Some(archive) = self.media.as_archive() else {
            info!(
                job = JOB_NAME,
                backend = self.media.name(),
                "Media store does not support archival, skipping"
            );
            return Ok(SweepReport::default());
        };

        let started = Instant::now();
        let candidates = self.posts.archival_candidates(now).await?;
        let total = candidates.len();
        info!(job = JOB_NAME, count = total, "Starting post archival");

        let mut report = SweepReport::default();
        'posts: for candidate in candidates {
            if started.elapsed() >= self.options.soft_timeout {
                report.skipped_due_to_timeout = total - report.processed;
                warn!(
                    job = JOB_NAME,
                    remaining = report.skipped_due_to_timeout,
                    "Soft timeout reached, leaving remaining posts for the next run"
                );
                break;
            }
            report.processed += 1;

            for (kind, path) in self.resolver.resolve_all(&candidate.media) {
                let op = archive.move_to_archive(&path);
                if let Err(e) = bounded(self.options.media_op_timeout, op).await {
                    warn!(
                        post_id = %candidate.post_id,
                        media = %kind,
                        path = %path,
                        error = %e,
                        "Failed to archive blob, post stays in STANDARD"
                    );
                    report.failed += 1;
                    continue 'posts;
                }
            }

            match self.posts.mark_archived(candidate.post_id, now).await {
                Ok(true) => {
                    debug!(
                        post_id = %candidate.post_id,
                        age_days = candidate.age_days,
                        "Archived post"
                    );
                    report.succeeded += 1;
                }
                Ok(false) => {
                    debug!(post_id = %candidate.post_id, "Post vanished before it could be marked archived");
                }
                Err(e) => {
                    warn!(post_id = %candidate.post_id, error = %e, "Failed to mark post archived");
                    report.failed += 1;
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            job = JOB_NAME,
            archived = report.succeeded,
            failed = report.failed,
            skipped = report.skipped_due_to_timeout,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Post archival completed"
        );
        Ok(report)
    }
}
