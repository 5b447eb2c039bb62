//! Show command for hypefeed.
//!
//! Displays a single published post with its hype count.

use serde::Serialize;
use uuid::Uuid;

use crate::core::HypedPost;
use crate::feed::FeedQueryService;
use crate::storage::{HypeStore, PostStore, TagStatsStore};

/// Options for the show command.
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Post ID.
    pub id: String,
    /// User whose own hype is marked.
    pub viewer: Option<String>,
}

/// Output format for the show command.
#[derive(Debug, Clone, Serialize)]
pub struct ShowOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<HypedPost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShowOutput {
    pub fn success(post: HypedPost) -> Self {
        Self {
            success: true,
            post: Some(post),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            post: None,
            error: Some(error.into()),
        }
    }
}

/// The show command implementation.
pub struct ShowCommand<T: TagStatsStore, P: PostStore, H: HypeStore> {
    query: FeedQueryService<T, P, H>,
}

impl<T: TagStatsStore, P: PostStore, H: HypeStore> ShowCommand<T, P, H> {
    pub fn new(query: FeedQueryService<T, P, H>) -> Self {
        Self { query }
    }

    /// Run the show command.
    pub fn run(&self, options: &ShowOptions) -> ShowOutput {
        let Ok(id) = Uuid::parse_str(options.id.trim()) else {
            return ShowOutput::failure(format!("invalid post id: {}", options.id));
        };

        let found = self.query.get_post(&id).and_then(|post| match post {
            Some(post) => self
                .query
                .with_hypes(vec![post], options.viewer.as_deref())
                .map(|mut listed| listed.pop()),
            None => Ok(None),
        });

        match found {
            Ok(Some(item)) => ShowOutput::success(item),
            // Drafts look the same as missing posts
            Ok(None) => ShowOutput::failure(format!("post not found: {}", id)),
            Err(e) => ShowOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ShowOutput, options: &ShowOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        match &output.post {
            Some(item) => {
                let post = &item.post;
                let mut lines = super::format_post(post);
                if post.updated_at != post.created_at {
                    lines.push(format!(
                        "   Updated: {}",
                        post.updated_at.format("%Y-%m-%d %H:%M UTC")
                    ));
                }
                lines.push(super::format_hypes(item));
                lines.join("\n") + "\n"
            }
            None => format!(
                "Show failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::core::{NewPost, Post};
    use crate::storage::{MemoryHypeStore, MemoryPostStore, MemoryTagStatsStore};
    use chrono::Utc;
    use std::sync::Arc;

    type MemoryShow = ShowCommand<MemoryTagStatsStore, Arc<MemoryPostStore>, Arc<MemoryHypeStore>>;

    fn command_with(posts: &[Post]) -> MemoryShow {
        command_with_hypes(posts, Arc::new(MemoryHypeStore::new()))
    }

    fn command_with_hypes(posts: &[Post], hypes: Arc<MemoryHypeStore>) -> MemoryShow {
        let store = Arc::new(MemoryPostStore::new());
        for post in posts {
            store.put(post).unwrap();
        }
        ShowCommand::new(FeedQueryService::new(
            MemoryTagStatsStore::new(),
            store,
            hypes,
        ))
    }

    fn post(draft: bool) -> Post {
        let mut new = NewPost::text("ada", "look #here");
        if draft {
            new = new.draft();
        }
        new.into_post(&FeedConfig::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_show_published() {
        let published = post(false);
        let cmd = command_with(&[published.clone()]);
        let options = ShowOptions {
            id: published.id.to_string(),
            ..Default::default()
        };

        let output = cmd.run(&options);
        assert!(output.success);

        let human = cmd.format_output(&output, &options);
        assert!(human.contains("by ada"));
        assert!(human.contains("Tags: HERE"));
        assert!(human.contains("Hypes: 0"));
    }

    #[test]
    fn test_show_hype_state_for_viewer() {
        let published = post(false);
        let hypes = Arc::new(MemoryHypeStore::new());
        hypes.toggle(&published.id, "bob").unwrap();
        let cmd = command_with_hypes(&[published.clone()], hypes);

        let options = ShowOptions {
            json: true,
            id: published.id.to_string(),
            viewer: Some("bob".into()),
            ..Default::default()
        };
        let output = cmd.run(&options);
        let item = output.post.clone().unwrap();
        assert_eq!(item.hype_count, 1);
        assert_eq!(item.is_hyped, Some(true));

        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(parsed["post"]["hype_count"], 1);
        assert_eq!(parsed["post"]["is_hyped"], true);
    }

    #[test]
    fn test_show_hides_draft() {
        let draft = post(true);
        let cmd = command_with(&[draft.clone()]);

        let output = cmd.run(&ShowOptions {
            id: draft.id.to_string(),
            ..Default::default()
        });
        assert!(!output.success);
        assert!(output.error.unwrap().starts_with("post not found"));
    }

    #[test]
    fn test_show_invalid_id_json() {
        let cmd = command_with(&[]);
        let options = ShowOptions {
            json: true,
            id: "nope".into(),
            ..Default::default()
        };
        let output = cmd.run(&options);

        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(parsed["success"], false);
        assert!(parsed.get("post").is_none());
    }
}
