//! Mapping persisted public media URLs back to storage-relative blob paths.

use std::future::Future;
use std::time::Duration;

use crate::domain::{MediaKind, MediaUrls};
use crate::ports::MediaError;

const GCS_HOST: &str = "storage.googleapis.com/";

/// Derives the blob path for a stored media URL.
///
/// URLs starting with a known prefix yield the remainder. Unknown shapes fall
/// back to the last two path segments, which is a best-effort guess.
#[derive(Debug, Clone, Default)]
pub struct MediaPathResolver {
    prefixes: Vec<String>,
}

impl MediaPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct object-store URL forms for `bucket`.
    pub fn for_bucket(bucket: &str) -> Self {
        Self::new()
            .with_prefix(format!("https://{GCS_HOST}{bucket}/"))
            .with_prefix(format!("https://{bucket}.s3.amazonaws.com/"))
    }

    /// Adds a known prefix. Blank prefixes are ignored.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into().trim().to_string();
        if prefix.is_empty() {
            return self;
        }
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        if !self.prefixes.contains(&prefix) {
            self.prefixes.push(prefix);
        }
        self
    }

    pub fn with_prefixes<I, S>(self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        prefixes.into_iter().fold(self, |r, p| r.with_prefix(p))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns `None` when the URL resolves to nothing.
    pub fn resolve(&self, url: &str) -> Option<String> {
        let url = strip_query(url.trim());
        if url.is_empty() {
            return None;
        }

        for prefix in &self.prefixes {
            if let Some(rest) = url.strip_prefix(prefix.as_str()) {
                return non_empty(rest.trim_start_matches('/'));
            }
        }

        // Any bucket on the GCS host.
        if let Some(idx) = url.find(GCS_HOST) {
            let after_host = &url[idx + GCS_HOST.len()..];
            if let Some((_bucket, rest)) = after_host.split_once('/') {
                return non_empty(rest.trim_start_matches('/'));
            }
        }

        let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [.., dir, file] => Some(format!("{dir}/{file}")),
            _ => Some(url.to_string()),
        }
    }

    /// Resolves every present media URL, in image, video, thumbnail order.
    pub fn resolve_all(&self, media: &MediaUrls) -> Vec<(MediaKind, String)> {
        media
            .iter()
            .filter_map(|(kind, url)| self.resolve(url).map(|path| (kind, path)))
            .collect()
    }
}

/// Bounds a media store call, turning an elapsed deadline into `MediaError::Timeout`.
pub(crate) async fn bounded<F>(limit: Duration, op: F) -> Result<(), MediaError>
where
    F: Future<Output = Result<(), MediaError>>,
{
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result,
        Err(_) => Err(MediaError::Timeout(limit)),
    }
}

fn strip_query(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(idx) => &url[..idx],
        None => url,
    }
}

fn non_empty(path: &str) -> Option<String> {
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> MediaPathResolver {
        MediaPathResolver::for_bucket("campus-media")
            .with_prefix("https://cdn.campus.edu")
            .with_prefix("http://localhost:8080/media/")
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        };
        let result = bounded(Duration::from_secs(1), slow).await;
        assert!(matches!(result, Err(MediaError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_errors() {
        let result = bounded(Duration::from_secs(1), async {
            Err(MediaError::Backend("boom".into()))
        })
        .await;
        assert!(matches!(result, Err(MediaError::Backend(_))));
    }

    #[test]
    fn test_direct_bucket_url() {
        let path = resolver().resolve("https://storage.googleapis.com/campus-media/posts/2025/a.jpg");
        assert_eq!(path.as_deref(), Some("posts/2025/a.jpg"));
    }

    #[test]
    fn test_s3_and_cdn_urls() {
        let r = resolver();
        assert_eq!(
            r.resolve("https://campus-media.s3.amazonaws.com/stories/v.mp4").as_deref(),
            Some("stories/v.mp4")
        );
        assert_eq!(
            r.resolve("https://cdn.campus.edu/posts/x/y.png?v=3#top").as_deref(),
            Some("posts/x/y.png")
        );
    }

    #[test]
    fn test_other_gcs_bucket() {
        let path = resolver().resolve("https://storage.googleapis.com/legacy-bucket/a/b/c.jpg");
        assert_eq!(path.as_deref(), Some("a/b/c.jpg"));
    }

    #[test]
    fn test_unknown_url_uses_last_two_segments() {
        let path = resolver().resolve("https://elsewhere.example.com/deep/nested/thumbs/t.jpg");
        assert_eq!(path.as_deref(), Some("thumbs/t.jpg"));
    }

    #[test]
    fn test_short_and_empty_values() {
        let r = resolver();
        assert_eq!(r.resolve("file.jpg").as_deref(), Some("file.jpg"));
        assert_eq!(r.resolve("   "), None);
        assert_eq!(r.resolve("https://cdn.campus.edu/"), None);
    }

    #[test]
    fn test_resolve_all_keeps_slot_order() {
        let media = MediaUrls {
            image_url: None,
            video_url: Some("https://cdn.campus.edu/v/clip.mp4".to_string()),
            thumbnail_url: Some("https://cdn.campus.edu/t/clip.jpg".to_string()),
        };
        let paths = resolver().resolve_all(&media);
        assert_eq!(
            paths,
            vec![
                (MediaKind::Video, "v/clip.mp4".to_string()),
                (MediaKind::Thumbnail, "t/clip.jpg".to_string()),
            ]
        );
    }
}
