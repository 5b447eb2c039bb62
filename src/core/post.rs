//! Post entity and authoring validation.
//!
//! Posts are the collaborator records whose tag sets feed the statistics.
//! Tags are normalized here, before persistence; nothing downstream
//! re-normalizes them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::core::tags::{extract_hashtags, normalize_tags};
use crate::error::{FeedError, Result};

/// Kind of content a post carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Text,
    Image,
    Video,
}

impl ContentType {
    /// Whether this content type needs a media reference.
    pub fn requires_media(&self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TEXT" => Ok(Self::Text),
            "IMAGE" => Ok(Self::Image),
            "VIDEO" => Ok(Self::Video),
            other => Err(FeedError::validation(format!(
                "unknown content type '{}' (expected TEXT, IMAGE or VIDEO)",
                other
            ))),
        }
    }
}

/// A persisted post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique content identifier.
    pub id: Uuid,
    /// Author handle.
    pub author: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub text_content: String,
    /// Reference to uploaded media (path or URL).
    #[serde(default)]
    pub media_file: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Normalized tags (upper-case, de-duplicated).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Only published posts count toward tag statistics and appear in feeds.
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether this post carries any of the given (normalized) tags.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub author: String,
    pub content_type: ContentType,
    pub text_content: String,
    pub media_file: Option<String>,
    pub description: String,
    /// Explicit tags, raw. Hashtags in the text are added during validation.
    pub tags: Vec<String>,
    pub is_published: bool,
}

impl NewPost {
    /// A published text post.
    pub fn text(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content_type: ContentType::Text,
            text_content: text.into(),
            media_file: None,
            description: String::new(),
            tags: Vec::new(),
            is_published: true,
        }
    }

    /// A published media post.
    pub fn media(
        author: impl Into<String>,
        content_type: ContentType,
        media_file: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            content_type,
            text_content: String::new(),
            media_file: Some(media_file.into()),
            description: String::new(),
            tags: Vec::new(),
            is_published: true,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the post as a draft.
    pub fn draft(mut self) -> Self {
        self.is_published = false;
        self
    }

    /// Validate the content and build the post to persist.
    pub fn into_post(self, limits: &FeedConfig, now: DateTime<Utc>) -> Result<Post> {
        if self.author.trim().is_empty() {
            return Err(FeedError::validation("Author is required."));
        }
        validate_content(
            self.content_type,
            &self.text_content,
            self.media_file.as_deref(),
        )?;
        let tags = assemble_tags(
            &self.tags,
            &self.text_content,
            &self.description,
            limits,
        )?;

        Ok(Post {
            id: Uuid::new_v4(),
            author: self.author.trim().to_string(),
            content_type: self.content_type,
            text_content: self.text_content,
            media_file: self.media_file,
            description: self.description,
            tags,
            is_published: self.is_published,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Changes applied to an existing post. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostEdit {
    pub text_content: Option<String>,
    pub description: Option<String>,
    /// Replacement explicit tags, raw.
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl PostEdit {
    pub fn is_empty(&self) -> bool {
        self.text_content.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.is_published.is_none()
    }

    /// Apply the edit to `post`, re-validating content and tags.
    ///
    /// Tags are recomputed only when the text, description, or tags change.
    pub fn apply(self, post: &mut Post, limits: &FeedConfig, now: DateTime<Utc>) -> Result<()> {
        let retag = self.text_content.is_some() || self.description.is_some() || self.tags.is_some();

        let text = self.text_content.unwrap_or_else(|| post.text_content.clone());
        let description = self.description.unwrap_or_else(|| post.description.clone());
        validate_content(post.content_type, &text, post.media_file.as_deref())?;

        if retag {
            let explicit = self.tags.unwrap_or_else(|| post.tags.clone());
            post.tags = assemble_tags(&explicit, &text, &description, limits)?;
        }
        post.text_content = text;
        post.description = description;
        if let Some(published) = self.is_published {
            post.is_published = published;
        }
        post.updated_at = now;
        Ok(())
    }
}

/// Check the content-type rules.
fn validate_content(content_type: ContentType, text: &str, media_file: Option<&str>) -> Result<()> {
    let has_media = media_file.map(|m| !m.trim().is_empty()).unwrap_or(false);

    if content_type == ContentType::Text && text.trim().is_empty() {
        return Err(FeedError::validation(
            "Text content is required for TEXT posts.",
        ));
    }
    if content_type.requires_media() && !has_media {
        return Err(FeedError::validation(format!(
            "Media file is required for {} posts.",
            content_type
        )));
    }
    if content_type == ContentType::Text && has_media {
        return Err(FeedError::validation(
            "Cannot include media file if content type is TEXT.",
        ));
    }
    Ok(())
}

/// Combine explicit tags with hashtags from the text and description.
pub fn assemble_tags(
    explicit: &[String],
    text: &str,
    description: &str,
    limits: &FeedConfig,
) -> Result<Vec<String>> {
    let combined = explicit
        .iter()
        .cloned()
        .chain(extract_hashtags(text))
        .chain(extract_hashtags(description));
    let tags = normalize_tags(combined);

    if tags.len() > limits.max_tags_per_post {
        return Err(FeedError::validation(format!(
            "A post cannot have more than {} tags.",
            limits.max_tags_per_post
        )));
    }
    if let Some(long) = tags
        .iter()
        .find(|t| t.chars().count() > limits.max_tag_length)
    {
        return Err(FeedError::validation(format!(
            "Tag '{}' is longer than {} characters.",
            long, limits.max_tag_length
        )));
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> FeedConfig {
        FeedConfig::default()
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!("text".parse::<ContentType>().unwrap(), ContentType::Text);
        assert_eq!(" Video ".parse::<ContentType>().unwrap(), ContentType::Video);
        assert!("gif".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_content_type_serializes_uppercase() {
        let json = serde_json::to_string(&ContentType::Image).unwrap();
        assert_eq!(json, "\"IMAGE\"");
    }

    #[test]
    fn test_text_post_builds() {
        let post = NewPost::text("ada", "Robotics night #stem")
            .with_tags(["science", " Science "])
            .into_post(&limits(), Utc::now())
            .unwrap();

        assert_eq!(post.author, "ada");
        assert_eq!(post.tags, vec!["SCIENCE", "STEM"]);
        assert!(post.is_published);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_text_post_requires_text() {
        let err = NewPost::text("ada", "   ")
            .into_post(&limits(), Utc::now())
            .unwrap_err();
        assert!(err.to_string().contains("Text content is required"));
    }

    #[test]
    fn test_media_post_requires_media() {
        let mut draft = NewPost::media("ada", ContentType::Image, "");
        draft.media_file = None;
        let err = draft.into_post(&limits(), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("Media file is required for IMAGE"));
    }

    #[test]
    fn test_text_post_rejects_media() {
        let mut draft = NewPost::text("ada", "hello");
        draft.media_file = Some("uploads/cat.png".to_string());
        let err = draft.into_post(&limits(), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("Cannot include media file"));
    }

    #[test]
    fn test_missing_author_rejected() {
        let err = NewPost::text(" ", "hello")
            .into_post(&limits(), Utc::now())
            .unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_tag_cap() {
        let tags: Vec<String> = (0..11).map(|i| format!("tag{}", i)).collect();
        let err = NewPost::text("ada", "hello")
            .with_tags(tags)
            .into_post(&limits(), Utc::now())
            .unwrap_err();
        assert!(err.to_string().contains("more than 10 tags"));
    }

    #[test]
    fn test_tag_cap_counts_after_dedup() {
        let mut tags: Vec<String> = (0..10).map(|i| format!("tag{}", i)).collect();
        tags.push("TAG0".to_string());
        let post = NewPost::text("ada", "hello #tag1")
            .with_tags(tags)
            .into_post(&limits(), Utc::now())
            .unwrap();
        assert_eq!(post.tags.len(), 10);
    }

    #[test]
    fn test_tag_length_limit() {
        let err = NewPost::text("ada", "hello")
            .with_tags(["x".repeat(21)])
            .into_post(&limits(), Utc::now())
            .unwrap_err();
        assert!(err.to_string().contains("longer than 20"));
    }

    #[test]
    fn test_description_hashtags_included() {
        let post = NewPost::media("ada", ContentType::Video, "uploads/demo.mp4")
            .with_description("Demo day #Hackathon")
            .into_post(&limits(), Utc::now())
            .unwrap();
        assert_eq!(post.tags, vec!["HACKATHON"]);
    }

    #[test]
    fn test_edit_replaces_tags_and_bumps_updated_at() {
        let created = Utc::now();
        let mut post = NewPost::text("ada", "hello")
            .with_tags(["art"])
            .into_post(&limits(), created)
            .unwrap();

        let later = created + chrono::Duration::minutes(5);
        let edit = PostEdit {
            tags: Some(vec!["music".to_string()]),
            ..Default::default()
        };
        edit.apply(&mut post, &limits(), later).unwrap();

        assert_eq!(post.tags, vec!["MUSIC"]);
        assert_eq!(post.updated_at, later);
        assert_eq!(post.created_at, created);
    }

    #[test]
    fn test_edit_publish_only_keeps_tags() {
        let mut post = NewPost::text("ada", "hello #art")
            .draft()
            .into_post(&limits(), Utc::now())
            .unwrap();

        let edit = PostEdit {
            is_published: Some(true),
            ..Default::default()
        };
        edit.apply(&mut post, &limits(), Utc::now()).unwrap();

        assert!(post.is_published);
        assert_eq!(post.tags, vec!["ART"]);
    }

    #[test]
    fn test_edit_rejects_empty_text() {
        let mut post = NewPost::text("ada", "hello")
            .into_post(&limits(), Utc::now())
            .unwrap();
        let edit = PostEdit {
            text_content: Some(String::new()),
            ..Default::default()
        };
        assert!(edit.apply(&mut post, &limits(), Utc::now()).is_err());
        assert_eq!(post.text_content, "hello");
    }

    #[test]
    fn test_has_any_tag() {
        let post = NewPost::text("ada", "hello")
            .with_tags(["science", "tech"])
            .into_post(&limits(), Utc::now())
            .unwrap();
        assert!(post.has_any_tag(&["ART".to_string(), "TECH".to_string()]));
        assert!(!post.has_any_tag(&["ART".to_string()]));
        assert!(!post.has_any_tag(&[]));
    }
}
