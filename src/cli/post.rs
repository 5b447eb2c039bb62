//! Post command for hypefeed.
//!
//! Creates a post and reports the tag statistics it touched.

use serde::Serialize;

use crate::content::{PostService, PostWrite};
use crate::core::{ContentType, NewPost, Post};
use crate::stats::UpdateSummary;
use crate::storage::{HypeStore, PostStore, TagStatsStore};

/// Options for the post command.
#[derive(Debug, Clone)]
pub struct PostOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    pub author: String,
    pub content_type: ContentType,
    pub text: Option<String>,
    pub media: Option<String>,
    pub description: Option<String>,
    /// Explicit tags, raw.
    pub tags: Vec<String>,
    /// Save without publishing.
    pub draft: bool,
}

impl Default for PostOptions {
    fn default() -> Self {
        Self {
            json: false,
            quiet: false,
            author: String::new(),
            content_type: ContentType::Text,
            text: None,
            media: None,
            description: None,
            tags: Vec::new(),
            draft: false,
        }
    }
}

impl PostOptions {
    fn to_new_post(&self) -> NewPost {
        let mut new = match (self.content_type, &self.media) {
            (ContentType::Text, media) => {
                let mut new = NewPost::text(&self.author, self.text.clone().unwrap_or_default());
                new.media_file = media.clone();
                new
            }
            (content_type, media) => {
                let mut new =
                    NewPost::media(&self.author, content_type, media.clone().unwrap_or_default());
                new.text_content = self.text.clone().unwrap_or_default();
                new
            }
        };
        if let Some(description) = &self.description {
            new = new.with_description(description);
        }
        new = new.with_tags(self.tags.iter().cloned());
        if self.draft {
            new = new.draft();
        }
        new
    }
}

/// Output of the post and edit commands.
#[derive(Debug, Clone, Serialize)]
pub struct PostOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
    /// Tag statistics touched; absent when the update failed or on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<UpdateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PostOutput {
    pub fn success(write: PostWrite) -> Self {
        Self {
            success: true,
            post: Some(write.post),
            stats: write.stats,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            post: None,
            stats: None,
            error: Some(error.into()),
        }
    }

    /// Human-readable rendering shared with the edit command.
    pub(crate) fn format_human_readable(&self, action: &str, done: &str) -> String {
        let post = match (&self.post, self.success) {
            (Some(post), true) => post,
            _ => {
                return format!(
                    "{} failed: {}\n",
                    action,
                    self.error.as_deref().unwrap_or("unknown error")
                )
            }
        };

        let mut lines = vec![format!("{} {}", done, post.id)];
        lines.extend(super::format_post(post));
        match &self.stats {
            Some(stats) if stats.skipped => {
                lines.push("   Draft: tag stats unchanged".to_string());
            }
            Some(stats) => {
                if !stats.inserted.is_empty() {
                    lines.push(format!("   New tags: {}", stats.inserted.join(", ")));
                }
            }
            None => lines.push("   Warning: tag stats were not updated".to_string()),
        }
        lines.join("\n") + "\n"
    }
}

/// The post command implementation.
pub struct PostCommand<P: PostStore, T: TagStatsStore, H: HypeStore> {
    service: PostService<P, T, H>,
}

impl<P: PostStore, T: TagStatsStore, H: HypeStore> PostCommand<P, T, H> {
    pub fn new(service: PostService<P, T, H>) -> Self {
        Self { service }
    }

    /// Run the post command.
    pub fn run(&self, options: &PostOptions) -> PostOutput {
        match self.service.create(options.to_new_post()) {
            Ok(write) => PostOutput::success(write),
            Err(e) => PostOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &PostOutput, options: &PostOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            output.format_human_readable("Post", "Posted")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::stats::FeedStatsUpdater;
    use crate::storage::{MemoryHypeStore, MemoryPostStore, MemoryTagStatsStore};
    use std::sync::Arc;

    fn command() -> (
        PostCommand<Arc<MemoryPostStore>, Arc<MemoryTagStatsStore>, Arc<MemoryHypeStore>>,
        Arc<MemoryTagStatsStore>,
    ) {
        let tags = Arc::new(MemoryTagStatsStore::new());
        let service = PostService::new(
            Arc::new(MemoryPostStore::new()),
            FeedStatsUpdater::new(Arc::clone(&tags)),
            Arc::new(MemoryHypeStore::new()),
            FeedConfig::default(),
        );
        (PostCommand::new(service), tags)
    }

    fn text_post(text: &str) -> PostOptions {
        PostOptions {
            author: "ada".into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_post_text() {
        let (cmd, tags) = command();
        let options = PostOptions {
            tags: vec!["science".into()],
            ..text_post("Hello #world")
        };

        let output = cmd.run(&options);

        assert!(output.success);
        let post = output.post.as_ref().unwrap();
        assert_eq!(post.tags, vec!["SCIENCE", "WORLD"]);
        assert_eq!(tags.count().unwrap(), 2);

        let human = cmd.format_output(&output, &options);
        assert!(human.starts_with("Posted "));
        assert!(human.contains("New tags: SCIENCE, WORLD"));
    }

    #[test]
    fn test_post_media_requires_file() {
        let (cmd, _) = command();
        let options = PostOptions {
            author: "ada".into(),
            content_type: ContentType::Image,
            ..Default::default()
        };
        assert_eq!(options.media, None);

        let output = cmd.run(&options);
        assert!(!output.success);
        assert!(output.error.as_deref().unwrap().contains("Media file is required"));
        assert!(cmd
            .format_output(&output, &options)
            .starts_with("Post failed:"));
    }

    #[test]
    fn test_post_image_with_caption() {
        let (cmd, _) = command();
        let options = PostOptions {
            author: "ada".into(),
            content_type: ContentType::Image,
            media: Some("uploads/cat.png".into()),
            description: Some("my cat #pets".into()),
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);
        let post = output.post.unwrap();
        assert_eq!(post.media_file.as_deref(), Some("uploads/cat.png"));
        assert_eq!(post.tags, vec!["PETS"]);
    }

    #[test]
    fn test_text_post_rejects_media() {
        let (cmd, _) = command();
        let options = PostOptions {
            media: Some("x.png".into()),
            ..text_post("hi")
        };
        assert!(!cmd.run(&options).success);
    }

    #[test]
    fn test_draft_reports_skipped_stats() {
        let (cmd, tags) = command();
        let options = PostOptions {
            draft: true,
            ..text_post("wip #draft")
        };

        let output = cmd.run(&options);
        assert!(output.stats.as_ref().unwrap().skipped);
        assert!(tags.is_empty());
        assert!(cmd
            .format_output(&output, &options)
            .contains("tag stats unchanged"));
    }

    #[test]
    fn test_json_output() {
        let (cmd, _) = command();
        let options = PostOptions {
            json: true,
            ..text_post("#rust")
        };
        let output = cmd.run(&options);

        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["post"]["content_type"], "TEXT");
        assert_eq!(parsed["stats"]["inserted"][0], "RUST");
        assert!(parsed.get("error").is_none());
    }
}
