//! Application state - shared across all handlers.

use std::sync::Arc;

use campus_core::lifecycle::{PostArchivalSweep, StoryExpiryReaper};
use campus_core::ports::{
    Clock, EngagementRepository, MediaStore, PostRepository, StoryRepository, TokenService,
    UserDirectory, ViewSink,
};
use campus_core::services::{ContentService, EngagementService, FeedService};
use campus_infra::{
    DatabaseConfig, InMemoryFeedStore, InMemoryMediaStore, InMemoryUserDirectory,
    JwtTokenService, LocalMediaStore, SystemClock, ViewQueue,
};

use crate::config::{AppConfig, MediaConfig, MediaProvider};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentService>,
    pub engagement: Arc<EngagementService>,
    pub feed: Arc<FeedService>,
    pub views: Arc<dyn ViewSink>,
    pub tokens: Arc<dyn TokenService>,
    pub jobs: LifecycleJobs,
    view_queue: Arc<ViewQueue>,
}

/// The two background sweeps, shared with the scheduler.
#[derive(Clone)]
pub struct LifecycleJobs {
    pub story_reaper: Arc<StoryExpiryReaper>,
    pub post_archival: Arc<PostArchivalSweep>,
}

struct Repositories {
    posts: Arc<dyn PostRepository>,
    engagement: Arc<dyn EngagementRepository>,
    stories: Arc<dyn StoryRepository>,
    users: Arc<dyn UserDirectory>,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryFeedStore::new());
        Self {
            posts: store.clone(),
            engagement: store.clone(),
            stories: store,
            users: Arc::new(InMemoryUserDirectory::new()),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = repositories(config.database.as_ref()).await;
        let media = media_store(&config.media).await;
        let resolver = config.media.resolver();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let sweep = config.lifecycle.sweep;

        let content = Arc::new(ContentService::new(
            repos.posts.clone(),
            repos.stories.clone(),
            media.clone(),
            resolver.clone(),
            clock.clone(),
            sweep.media_op_timeout,
        ));
        let engagement = Arc::new(EngagementService::new(
            repos.posts.clone(),
            repos.engagement.clone(),
            repos.stories.clone(),
            clock.clone(),
        ));
        let feed = Arc::new(FeedService::new(
            repos.posts.clone(),
            repos.engagement.clone(),
            repos.stories.clone(),
            repos.users.clone(),
            clock.clone(),
        ));

        let jobs = LifecycleJobs {
            story_reaper: Arc::new(StoryExpiryReaper::new(
                repos.stories.clone(),
                media.clone(),
                resolver.clone(),
                clock.clone(),
                sweep,
            )),
            post_archival: Arc::new(PostArchivalSweep::new(
                repos.posts.clone(),
                media,
                resolver,
                clock,
                sweep,
            )),
        };

        let recorder = engagement.clone();
        let view_queue = Arc::new(ViewQueue::start(config.views.clone(), move |event| {
            let recorder = recorder.clone();
            async move { recorder.record_view(event).await }
        }));

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());

        tracing::info!(
            view_workers = config.views.workers,
            view_capacity = config.views.capacity,
            "Application state initialized"
        );

        Self {
            content,
            engagement,
            feed,
            views: view_queue.clone(),
            tokens,
            jobs,
            view_queue,
        }
    }

    /// Drain queued view events.
    pub async fn shutdown(&self) {
        self.view_queue.shutdown().await;
        let stats = self.view_queue.stats();
        tracing::info!(
            recorded = stats.recorded,
            dropped = stats.dropped,
            "View queue drained"
        );
    }
}

#[cfg(feature = "postgres")]
async fn repositories(db_config: Option<&DatabaseConfig>) -> Repositories {
    use campus_infra::database::connect;
    use campus_infra::{PostgresPostRepository, PostgresStoryRepository, PostgresUserDirectory};

    let Some(config) = db_config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Repositories::in_memory();
    };

    match connect(config).await {
        Ok(db) => {
            let posts = Arc::new(PostgresPostRepository::new(db.clone()));
            Repositories {
                posts: posts.clone(),
                engagement: posts,
                stories: Arc::new(PostgresStoryRepository::new(db.clone())),
                users: Arc::new(PostgresUserDirectory::new(db)),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            Repositories::in_memory()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn repositories(_db_config: Option<&DatabaseConfig>) -> Repositories {
    tracing::info!("Running without postgres feature - using in-memory repositories");
    Repositories::in_memory()
}

async fn media_store(config: &MediaConfig) -> Arc<dyn MediaStore> {
    let local = || -> Arc<dyn MediaStore> { Arc::new(LocalMediaStore::new(&config.local_path)) };

    let store: Arc<dyn MediaStore> = match config.provider {
        MediaProvider::Local => local(),
        MediaProvider::Memory => Arc::new(InMemoryMediaStore::new()),
        MediaProvider::S3 => match s3_store(config).await {
            Some(store) => store,
            None => local(),
        },
    };
    tracing::info!(
        provider = store.name(),
        archival = store.as_archive().is_some(),
        "Media store configured"
    );
    store
}

#[cfg(feature = "s3")]
async fn s3_store(config: &MediaConfig) -> Option<Arc<dyn MediaStore>> {
    let Some(bucket) = config.bucket.clone() else {
        tracing::warn!("MEDIA_PROVIDER=s3 without MEDIA_BUCKET, falling back to local storage");
        return None;
    };
    Some(Arc::new(campus_infra::S3MediaStore::from_env(bucket).await))
}

#[cfg(not(feature = "s3"))]
async fn s3_store(_config: &MediaConfig) -> Option<Arc<dyn MediaStore>> {
    tracing::warn!("MEDIA_PROVIDER=s3 requires the s3 feature, falling back to local storage");
    None
}
