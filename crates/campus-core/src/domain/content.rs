use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum number of hashtags kept on a post or story.
pub const MAX_HASHTAGS: usize = 30;
/// Maximum length of a single hashtag, in characters.
pub const MAX_HASHTAG_CHARS: usize = 100;

/// What a post or story carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Video,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Video => "video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "video" => Ok(ContentType::Video),
            other => Err(DomainError::validation(format!(
                "content_type must be one of text, image, video (got '{other}')"
            ))),
        }
    }
}

/// Object storage tier the media of a post currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StorageClass {
    #[default]
    Standard,
    Nearline,
    Coldline,
    Archive,
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Standard => "STANDARD",
            StorageClass::Nearline => "NEARLINE",
            StorageClass::Coldline => "COLDLINE",
            StorageClass::Archive => "ARCHIVE",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which media slot a URL was stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Thumbnail,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Thumbnail => "thumbnail",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public media URLs persisted on a post or story row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl MediaUrls {
    /// Blank URLs are treated as absent.
    pub fn normalized(self) -> Self {
        fn clean(url: Option<String>) -> Option<String> {
            url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
        }

        Self {
            image_url: clean(self.image_url),
            video_url: clean(self.video_url),
            thumbnail_url: clean(self.thumbnail_url),
        }
    }

    /// Present URLs in image, video, thumbnail order.
    pub fn iter(&self) -> impl Iterator<Item = (MediaKind, &str)> {
        [
            (MediaKind::Image, self.image_url.as_deref()),
            (MediaKind::Video, self.video_url.as_deref()),
            (MediaKind::Thumbnail, self.thumbnail_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, url)| url.map(|u| (kind, u)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Checks the field presence rules for posts.
    pub fn validate_for_post(
        &self,
        content_type: ContentType,
        duration_seconds: Option<i32>,
    ) -> Result<(), DomainError> {
        match content_type {
            ContentType::Text => {
                forbid(&self.image_url, "image_url", content_type)?;
                forbid(&self.video_url, "video_url", content_type)?;
                forbid(&self.thumbnail_url, "thumbnail_url", content_type)?;
                forbid(&duration_seconds, "duration_seconds", content_type)?;
            }
            ContentType::Image => {
                if self.image_url.is_none() {
                    return Err(DomainError::validation("image_url required for image content"));
                }
                forbid(&self.video_url, "video_url", content_type)?;
                forbid(&self.thumbnail_url, "thumbnail_url", content_type)?;
                forbid(&duration_seconds, "duration_seconds", content_type)?;
            }
            ContentType::Video => {
                if self.video_url.is_none() || self.thumbnail_url.is_none() {
                    return Err(DomainError::validation(
                        "video_url and thumbnail_url required for video content",
                    ));
                }
                forbid(&self.image_url, "image_url", content_type)?;
                require_positive_duration(duration_seconds)?;
            }
        }
        Ok(())
    }

    /// Checks the field presence rules for stories. Stories never carry text only.
    pub fn validate_for_story(
        &self,
        content_type: ContentType,
        duration_seconds: Option<i32>,
    ) -> Result<(), DomainError> {
        if self.thumbnail_url.is_none() {
            return Err(DomainError::validation("thumbnail_url required for stories"));
        }
        match content_type {
            ContentType::Text => Err(DomainError::validation(
                "stories support image or video content only",
            )),
            ContentType::Image => {
                if self.image_url.is_none() {
                    return Err(DomainError::validation("image_url required for image content"));
                }
                forbid(&self.video_url, "video_url", content_type)?;
                forbid(&duration_seconds, "duration_seconds", content_type)
            }
            ContentType::Video => {
                if self.video_url.is_none() {
                    return Err(DomainError::validation("video_url required for video content"));
                }
                forbid(&self.image_url, "image_url", content_type)?;
                require_positive_duration(duration_seconds)
            }
        }
    }
}

fn forbid<T>(value: &Option<T>, field: &str, content_type: ContentType) -> Result<(), DomainError> {
    match value {
        Some(_) => Err(DomainError::validation(format!(
            "{field} is not allowed for {content_type} content"
        ))),
        None => Ok(()),
    }
}

fn require_positive_duration(duration_seconds: Option<i32>) -> Result<(), DomainError> {
    match duration_seconds {
        Some(secs) if secs > 0 => Ok(()),
        _ => Err(DomainError::validation(
            "duration_seconds must be a positive number for video content",
        )),
    }
}

/// Normalizes user supplied hashtags: strips `#`, trims, lower-cases and drops
/// empties and duplicates while keeping first-seen order.
pub fn normalize_hashtags(raw: Vec<String>) -> Result<Vec<String>, DomainError> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim().trim_start_matches('#').trim().to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        if tag.chars().count() > MAX_HASHTAG_CHARS {
            return Err(DomainError::validation(format!(
                "hashtags must be at most {MAX_HASHTAG_CHARS} characters"
            )));
        }
        tags.push(tag);
    }

    if tags.len() > MAX_HASHTAGS {
        return Err(DomainError::validation(format!(
            "at most {MAX_HASHTAGS} hashtags are allowed"
        )));
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(image: Option<&str>, video: Option<&str>, thumb: Option<&str>) -> MediaUrls {
        MediaUrls {
            image_url: image.map(str::to_string),
            video_url: video.map(str::to_string),
            thumbnail_url: thumb.map(str::to_string),
        }
    }

    #[test]
    fn test_image_post_requires_image_url() {
        let err = urls(None, None, None)
            .validate_for_post(ContentType::Image, None)
            .unwrap_err();
        assert!(err.to_string().contains("image_url"));
    }

    #[test]
    fn test_image_url_rejected_on_video_post() {
        let err = urls(Some("a.jpg"), Some("v.mp4"), Some("t.jpg"))
            .validate_for_post(ContentType::Video, Some(30))
            .unwrap_err();
        assert!(err.to_string().contains("image_url is not allowed"));
    }

    #[test]
    fn test_video_post_needs_thumbnail_and_duration() {
        let missing_thumb = urls(None, Some("v.mp4"), None).validate_for_post(ContentType::Video, Some(10));
        assert!(missing_thumb.unwrap_err().to_string().contains("thumbnail_url"));

        let zero_duration =
            urls(None, Some("v.mp4"), Some("t.jpg")).validate_for_post(ContentType::Video, Some(0));
        assert!(zero_duration.unwrap_err().to_string().contains("duration_seconds"));

        assert!(
            urls(None, Some("v.mp4"), Some("t.jpg"))
                .validate_for_post(ContentType::Video, Some(12))
                .is_ok()
        );
    }

    #[test]
    fn test_text_post_rejects_media() {
        assert!(urls(None, None, None).validate_for_post(ContentType::Text, None).is_ok());
        assert!(
            urls(None, None, Some("t.jpg"))
                .validate_for_post(ContentType::Text, None)
                .is_err()
        );
    }

    #[test]
    fn test_story_rules() {
        let text = urls(None, None, Some("t.jpg")).validate_for_story(ContentType::Text, None);
        assert!(text.is_err());

        let no_thumb = urls(Some("a.jpg"), None, None).validate_for_story(ContentType::Image, None);
        assert!(no_thumb.unwrap_err().to_string().contains("thumbnail_url"));

        assert!(
            urls(Some("a.jpg"), None, Some("t.jpg"))
                .validate_for_story(ContentType::Image, None)
                .is_ok()
        );
    }

    #[test]
    fn test_blank_urls_are_absent() {
        let media = urls(Some("  "), None, Some("t.jpg")).normalized();
        assert_eq!(media.image_url, None);
        assert_eq!(media.iter().count(), 1);
    }

    #[test]
    fn test_normalize_hashtags() {
        let tags = normalize_hashtags(vec![
            "#Welcome".to_string(),
            "welcome".to_string(),
            "  ".to_string(),
            "Fest2025".to_string(),
        ])
        .unwrap();
        assert_eq!(tags, vec!["welcome".to_string(), "fest2025".to_string()]);
    }
}
