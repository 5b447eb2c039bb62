//! Edit command for hypefeed.

use uuid::Uuid;

use crate::cli::post::PostOutput;
use crate::content::PostService;
use crate::core::PostEdit;
use crate::storage::{HypeStore, PostStore, TagStatsStore};

/// Options for the edit command.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Post ID.
    pub id: String,
    pub text: Option<String>,
    pub description: Option<String>,
    /// Replacement tags. Empty leaves the tags alone.
    pub tags: Vec<String>,
    /// `Some(true)` to publish, `Some(false)` to unpublish.
    pub publish: Option<bool>,
}

impl EditOptions {
    fn to_edit(&self) -> PostEdit {
        PostEdit {
            text_content: self.text.clone(),
            description: self.description.clone(),
            tags: if self.tags.is_empty() {
                None
            } else {
                Some(self.tags.clone())
            },
            is_published: self.publish,
        }
    }
}

/// The edit command implementation.
pub struct EditCommand<P: PostStore, T: TagStatsStore, H: HypeStore> {
    service: PostService<P, T, H>,
}

impl<P: PostStore, T: TagStatsStore, H: HypeStore> EditCommand<P, T, H> {
    pub fn new(service: PostService<P, T, H>) -> Self {
        Self { service }
    }

    /// Run the edit command.
    pub fn run(&self, options: &EditOptions) -> PostOutput {
        let id = match Uuid::parse_str(options.id.trim()) {
            Ok(id) => id,
            Err(_) => return PostOutput::failure(format!("invalid post id: {}", options.id)),
        };

        let edit = options.to_edit();
        if edit.is_empty() {
            return PostOutput::failure("nothing to change");
        }

        match self.service.edit(&id, edit) {
            Ok(write) => PostOutput::success(write),
            Err(e) => PostOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &PostOutput, options: &EditOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            output.format_human_readable("Edit", "Edited")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::core::NewPost;
    use crate::stats::FeedStatsUpdater;
    use crate::storage::{MemoryHypeStore, MemoryPostStore, MemoryTagStatsStore};
    use std::sync::Arc;

    struct Fixture {
        cmd: EditCommand<Arc<MemoryPostStore>, Arc<MemoryTagStatsStore>, Arc<MemoryHypeStore>>,
        service: PostService<Arc<MemoryPostStore>, Arc<MemoryTagStatsStore>, Arc<MemoryHypeStore>>,
        tags: Arc<MemoryTagStatsStore>,
    }

    fn fixture() -> Fixture {
        let tags = Arc::new(MemoryTagStatsStore::new());
        let service = PostService::new(
            Arc::new(MemoryPostStore::new()),
            FeedStatsUpdater::new(Arc::clone(&tags)),
            Arc::new(MemoryHypeStore::new()),
            FeedConfig::default(),
        );
        Fixture {
            cmd: EditCommand::new(service.clone()),
            service,
            tags,
        }
    }

    #[test]
    fn test_edit_text_retags_without_counting() {
        let f = fixture();
        let post = f
            .service
            .create(NewPost::text("ada", "first #science"))
            .unwrap()
            .post;

        let options = EditOptions {
            id: post.id.to_string(),
            text: Some("second #science #art".into()),
            ..Default::default()
        };
        let output = f.cmd.run(&options);

        assert!(output.success);
        let edited = output.post.as_ref().unwrap();
        assert!(edited.tags.contains(&"ART".to_string()));
        assert_eq!(f.tags.get("SCIENCE").unwrap().unwrap().total_used, 1);
        assert!(f
            .cmd
            .format_output(&output, &options)
            .starts_with("Edited "));
    }

    #[test]
    fn test_publish_draft() {
        let f = fixture();
        let post = f
            .service
            .create(NewPost::text("ada", "#later").draft())
            .unwrap()
            .post;

        let output = f.cmd.run(&EditOptions {
            id: post.id.to_string(),
            publish: Some(true),
            ..Default::default()
        });

        assert!(output.post.unwrap().is_published);
        assert_eq!(f.tags.get("LATER").unwrap().unwrap().total_used, 1);
    }

    #[test]
    fn test_invalid_id() {
        let f = fixture();
        let options = EditOptions {
            id: "not-a-uuid".into(),
            text: Some("x".into()),
            ..Default::default()
        };
        let output = f.cmd.run(&options);
        assert!(!output.success);
        assert!(f
            .cmd
            .format_output(&output, &options)
            .starts_with("Edit failed: invalid post id"));
    }

    #[test]
    fn test_unknown_post() {
        let f = fixture();
        let output = f.cmd.run(&EditOptions {
            id: Uuid::new_v4().to_string(),
            text: Some("x".into()),
            ..Default::default()
        });
        assert!(!output.success);
        assert!(output.error.unwrap().contains("post not found"));
    }

    #[test]
    fn test_empty_edit_rejected() {
        let f = fixture();
        let post = f.service.create(NewPost::text("ada", "hi")).unwrap().post;
        let output = f.cmd.run(&EditOptions {
            id: post.id.to_string(),
            ..Default::default()
        });
        assert_eq!(output.error.as_deref(), Some("nothing to change"));
    }
}
