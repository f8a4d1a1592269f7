//! Cron-style scheduling of the story reaper and post archival sweep.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use campus_core::lifecycle::{SweepError, SweepReport};

use crate::config::LifecycleConfig;
use crate::state::LifecycleJobs;

/// Cron job scheduler owning both lifecycle jobs.
pub struct LifecycleScheduler {
    inner: JobScheduler,
    config: LifecycleConfig,
}

impl LifecycleScheduler {
    /// Create the scheduler and register both jobs.
    pub async fn new(config: LifecycleConfig, jobs: LifecycleJobs) -> Result<Self, JobSchedulerError> {
        let scheduler = Self {
            inner: JobScheduler::new().await?,
            config,
        };

        let reaper = jobs.story_reaper;
        scheduler
            .add_cron(&scheduler.config.story_reaper_cron, move || {
                let reaper = reaper.clone();
                async move { log_outcome(reaper.name(), reaper.run().await) }
            })
            .await?;

        let archival = jobs.post_archival;
        scheduler
            .add_cron(&scheduler.config.post_archival_cron, move || {
                let archival = archival.clone();
                async move { log_outcome(archival.name(), archival.run().await) }
            })
            .await?;

        Ok(scheduler)
    }

    /// Add a cron job.
    async fn add_cron<F, Fut>(&self, schedule: &str, task: F) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.scheduler_enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

fn log_outcome(job: &str, outcome: Result<SweepReport, SweepError>) {
    match outcome {
        Ok(report) => tracing::debug!(job, ?report, "Lifecycle job finished"),
        Err(SweepError::AlreadyRunning(_)) => {}
        Err(e) => tracing::error!(job, error = %e, "Lifecycle job failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use campus_core::lifecycle::{PostArchivalSweep, StoryExpiryReaper, SweepOptions};
    use campus_core::media::MediaPathResolver;
    use campus_infra::{InMemoryFeedStore, InMemoryMediaStore, SystemClock};

    use super::*;
    use crate::config::{DEFAULT_POST_ARCHIVAL_CRON, DEFAULT_STORY_REAPER_CRON};

    fn jobs() -> LifecycleJobs {
        let store = Arc::new(InMemoryFeedStore::new());
        let media = Arc::new(InMemoryMediaStore::new());
        let clock = Arc::new(SystemClock);
        let resolver = MediaPathResolver::new();
        let options = SweepOptions::default();

        LifecycleJobs {
            story_reaper: Arc::new(StoryExpiryReaper::new(
                store.clone(),
                media.clone(),
                resolver.clone(),
                clock.clone(),
                options,
            )),
            post_archival: Arc::new(PostArchivalSweep::new(store, media, resolver, clock, options)),
        }
    }

    fn config(story_reaper_cron: &str, post_archival_cron: &str) -> LifecycleConfig {
        LifecycleConfig {
            scheduler_enabled: true,
            story_reaper_cron: story_reaper_cron.to_string(),
            post_archival_cron: post_archival_cron.to_string(),
            sweep: SweepOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_default_schedules_register() {
        let config = config(DEFAULT_STORY_REAPER_CRON, DEFAULT_POST_ARCHIVAL_CRON);
        let mut scheduler = LifecycleScheduler::new(config, jobs()).await.unwrap();

        scheduler.start().await.unwrap();
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_schedule_is_rejected() {
        let config = config("every hour", DEFAULT_POST_ARCHIVAL_CRON);
        assert!(LifecycleScheduler::new(config, jobs()).await.is_err());
    }
}
