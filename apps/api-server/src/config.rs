//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use campus_core::lifecycle::SweepOptions;
use campus_core::media::MediaPathResolver;
use campus_infra::{DatabaseConfig, ViewQueueConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub media: MediaConfig,
    pub lifecycle: LifecycleConfig,
    pub views: ViewQueueConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            database: DatabaseConfig::from_env(),
            media: MediaConfig::from_env(),
            lifecycle: LifecycleConfig::from_env(),
            views: ViewQueueConfig::from_env(),
        }
    }
}

/// Which object storage backend holds post and story media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaProvider {
    Local,
    Memory,
    S3,
}

impl MediaProvider {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" => Some(MediaProvider::Local),
            "memory" => Some(MediaProvider::Memory),
            "s3" => Some(MediaProvider::S3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub provider: MediaProvider,
    pub local_path: String,
    pub public_base_url: Option<String>,
    pub bucket: Option<String>,
    pub cdn_url: Option<String>,
    pub extra_prefixes: Vec<String>,
}

impl MediaConfig {
    pub fn from_env() -> Self {
        let provider = match env::var("MEDIA_PROVIDER") {
            Ok(value) => MediaProvider::parse(&value).unwrap_or_else(|| {
                tracing::warn!(provider = %value, "Unknown MEDIA_PROVIDER, falling back to local");
                MediaProvider::Local
            }),
            Err(_) => MediaProvider::Local,
        };

        Self {
            provider,
            local_path: env::var("MEDIA_LOCAL_PATH").unwrap_or_else(|_| "./uploads".to_string()),
            public_base_url: non_empty_var("MEDIA_PUBLIC_BASE_URL"),
            bucket: non_empty_var("MEDIA_BUCKET"),
            cdn_url: non_empty_var("MEDIA_CDN_URL"),
            extra_prefixes: env::var("MEDIA_EXTRA_PREFIXES")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
        }
    }

    /// Resolver knowing every URL prefix this deployment writes.
    pub fn resolver(&self) -> MediaPathResolver {
        let resolver = match &self.bucket {
            Some(bucket) => MediaPathResolver::for_bucket(bucket),
            None => MediaPathResolver::new(),
        };
        resolver
            .with_prefixes(self.cdn_url.iter().cloned())
            .with_prefixes(self.public_base_url.iter().cloned())
            .with_prefixes(self.extra_prefixes.iter().cloned())
    }
}

/// Hourly, on the hour.
pub const DEFAULT_STORY_REAPER_CRON: &str = "0 0 * * * *";
/// Daily at 02:00.
pub const DEFAULT_POST_ARCHIVAL_CRON: &str = "0 0 2 * * *";

/// Schedules and limits for the story reaper and post archival jobs.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    pub scheduler_enabled: bool,
    pub story_reaper_cron: String,
    pub post_archival_cron: String,
    pub sweep: SweepOptions,
}

impl LifecycleConfig {
    pub fn from_env() -> Self {
        let defaults = SweepOptions::default();
        Self {
            scheduler_enabled: env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            story_reaper_cron: env::var("STORY_REAPER_CRON")
                .unwrap_or_else(|_| DEFAULT_STORY_REAPER_CRON.to_string()),
            post_archival_cron: env::var("POST_ARCHIVAL_CRON")
                .unwrap_or_else(|_| DEFAULT_POST_ARCHIVAL_CRON.to_string()),
            sweep: SweepOptions {
                soft_timeout: Duration::from_secs(parse_var(
                    "SWEEP_SOFT_TIMEOUT_SECS",
                    defaults.soft_timeout.as_secs(),
                )),
                media_op_timeout: Duration::from_secs(parse_var(
                    "MEDIA_OP_TIMEOUT_SECS",
                    defaults.media_op_timeout.as_secs(),
                )),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_provider_parse() {
        assert_eq!(MediaProvider::parse(" S3 "), Some(MediaProvider::S3));
        assert_eq!(MediaProvider::parse("memory"), Some(MediaProvider::Memory));
        assert_eq!(MediaProvider::parse("gcs"), None);
    }

    #[test]
    fn test_resolver_collects_prefixes() {
        let config = MediaConfig {
            provider: MediaProvider::S3,
            local_path: "./uploads".to_string(),
            public_base_url: Some("http://localhost:8080/uploads".to_string()),
            bucket: Some("campus-media".to_string()),
            cdn_url: Some("https://cdn.campus.edu".to_string()),
            extra_prefixes: split_list("https://old.campus.edu/, ,https://img.campus.edu"),
        };
        let resolver = config.resolver();

        assert_eq!(resolver.prefixes().len(), 6);
        assert_eq!(
            resolver.resolve("https://cdn.campus.edu/posts/a.jpg?v=2").as_deref(),
            Some("posts/a.jpg")
        );
        assert_eq!(
            resolver.resolve("https://campus-media.s3.amazonaws.com/stories/b.mp4").as_deref(),
            Some("stories/b.mp4")
        );
    }
}
