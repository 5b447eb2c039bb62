//! Feed command for hypefeed.
//!
//! Lists published posts, optionally filtered by tags (any match) or
//! narrowed to one author. Each post carries its hype count.

use serde::Serialize;

use crate::core::{parse_tag_filter, HypedPost};
use crate::feed::FeedQueryService;
use crate::storage::{HypeStore, PostStore, TagStatsStore};

/// Options for the feed command.
#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Comma-separated tag filter.
    pub tags: Option<String>,
    /// Only this author's posts.
    pub author: Option<String>,
    /// With `author`, include their drafts.
    pub include_drafts: bool,
    /// Maximum number of posts.
    pub limit: Option<usize>,
    /// User whose own hypes are marked.
    pub viewer: Option<String>,
}

/// Output format for the feed command.
#[derive(Debug, Clone, Serialize)]
pub struct FeedOutput {
    pub success: bool,
    pub count: usize,
    /// Normalized tag filter that was applied.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<String>,
    pub posts: Vec<HypedPost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FeedOutput {
    pub fn success(posts: Vec<HypedPost>, filter: Vec<String>) -> Self {
        Self {
            success: true,
            count: posts.len(),
            filter,
            posts,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            filter: Vec::new(),
            posts: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The feed command implementation.
pub struct FeedCommand<T: TagStatsStore, P: PostStore, H: HypeStore> {
    query: FeedQueryService<T, P, H>,
}

impl<T: TagStatsStore, P: PostStore, H: HypeStore> FeedCommand<T, P, H> {
    pub fn new(query: FeedQueryService<T, P, H>) -> Self {
        Self { query }
    }

    /// Run the feed command.
    pub fn run(&self, options: &FeedOptions) -> FeedOutput {
        let filter = options
            .tags
            .as_deref()
            .map(parse_tag_filter)
            .unwrap_or_default();

        let result = match &options.author {
            Some(author) => self
                .query
                .list_author_posts(author, options.include_drafts)
                .map(|posts| {
                    posts
                        .into_iter()
                        .filter(|p| filter.is_empty() || p.has_any_tag(&filter))
                        .collect::<Vec<_>>()
                }),
            None => self.query.list_posts_by_tags(filter.as_slice()),
        };

        let listed = result.and_then(|mut posts| {
            if let Some(limit) = options.limit {
                posts.truncate(limit);
            }
            self.query.with_hypes(posts, options.viewer.as_deref())
        });

        match listed {
            Ok(posts) => FeedOutput::success(posts, filter),
            Err(e) => FeedOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &FeedOutput, options: &FeedOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &FeedOutput) -> String {
        if !output.success {
            return format!(
                "Feed failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.posts.is_empty() {
            return "No posts found.\n".to_string();
        }

        let mut lines = Vec::new();
        if output.filter.is_empty() {
            lines.push(format!("{} post(s):\n", output.count));
        } else {
            lines.push(format!(
                "{} post(s) tagged {}:\n",
                output.count,
                output.filter.join(" or ")
            ));
        }

        for (i, item) in output.posts.iter().enumerate() {
            let mut rendered = super::format_post(&item.post);
            rendered[0] = format!("{}. {}", i + 1, rendered[0]);
            lines.extend(rendered);
            lines.push(super::format_hypes(item));
            lines.push(String::new());
        }

        lines.join("\n")
    }
}
