//! Tags command for hypefeed.
//!
//! Lists tag statistics in one of the supported orders.

use serde::Serialize;

use crate::core::{TagSort, TagStat};
use crate::feed::FeedQueryService;
use crate::storage::{HypeStore, PostStore, TagStatsStore};

/// Options for the tags command.
#[derive(Debug, Clone, Default)]
pub struct TagsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Sort key. `None` uses the configured default.
    pub sort: Option<String>,
    /// Maximum number of tags.
    pub limit: Option<usize>,
}

/// Output format for the tags command.
#[derive(Debug, Clone, Serialize)]
pub struct TagsOutput {
    pub success: bool,
    /// Sort actually applied, after fallback.
    pub sort: TagSort,
    pub count: usize,
    pub tags: Vec<TagStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TagsOutput {
    pub fn success(sort: TagSort, tags: Vec<TagStat>) -> Self {
        Self {
            success: true,
            sort,
            count: tags.len(),
            tags,
            error: None,
        }
    }

    pub fn failure(sort: TagSort, error: impl Into<String>) -> Self {
        Self {
            success: false,
            sort,
            count: 0,
            tags: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The tags command implementation.
pub struct TagsCommand<T: TagStatsStore, P: PostStore, H: HypeStore> {
    query: FeedQueryService<T, P, H>,
    default_sort: TagSort,
}

impl<T: TagStatsStore, P: PostStore, H: HypeStore> TagsCommand<T, P, H> {
    pub fn new(query: FeedQueryService<T, P, H>, default_sort: TagSort) -> Self {
        Self {
            query,
            default_sort,
        }
    }

    /// Run the tags command.
    pub fn run(&self, options: &TagsOptions) -> TagsOutput {
        let sort = match options.sort.as_deref() {
            Some(key) => TagSort::parse(key).unwrap_or_else(|| {
                tracing::debug!(key = %key, "unknown tag sort, using ranked");
                TagSort::Ranked
            }),
            None => self.default_sort,
        };

        match self.query.list_tags(sort) {
            Ok(mut tags) => {
                if let Some(limit) = options.limit {
                    tags.truncate(limit);
                }
                TagsOutput::success(sort, tags)
            }
            Err(e) => TagsOutput::failure(sort, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &TagsOutput, options: &TagsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &TagsOutput) -> String {
        if !output.success {
            return format!(
                "Tags failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.tags.is_empty() {
            return "No tags yet.\n".to_string();
        }

        let width = output.tags.iter().map(|t| t.tag.len()).max().unwrap_or(0);
        let mut lines = vec![format!("{} tag(s), sorted by {}:\n", output.count, output.sort)];
        for (i, stat) in output.tags.iter().enumerate() {
            lines.push(format!(
                "{:>3}. {:<width$}  rank {:>7.2}  used {:>5}  last {}",
                i + 1,
                stat.tag,
                stat.rank,
                stat.total_used,
                stat.last_used_at.format("%Y-%m-%d"),
                width = width
            ));
        }

        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{FeedStatsUpdater, PublishEvent};
    use crate::storage::{MemoryHypeStore, MemoryPostStore, MemoryTagStatsStore};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn command(
        default_sort: TagSort,
    ) -> TagsCommand<Arc<MemoryTagStatsStore>, MemoryPostStore, MemoryHypeStore> {
        let tags = Arc::new(MemoryTagStatsStore::new());
        let updater = FeedStatsUpdater::new(Arc::clone(&tags));
        let t0 = Utc::now() - Duration::days(30);

        // BETA used twice long ago, ALPHA once today
        for _ in 0..2 {
            updater
                .apply_at(&PublishEvent::new(vec!["BETA".into()], true, true), t0)
                .unwrap();
        }
        updater
            .apply(&PublishEvent::new(vec!["ALPHA".into()], true, true))
            .unwrap();

        TagsCommand::new(
            FeedQueryService::new(tags, MemoryPostStore::new(), MemoryHypeStore::new()),
            default_sort,
        )
    }

    fn names(output: &TagsOutput) -> Vec<&str> {
        output.tags.iter().map(|t| t.tag.as_str()).collect()
    }

    #[test]
    fn test_default_sort_is_used() {
        let cmd = command(TagSort::Alpha);
        let output = cmd.run(&TagsOptions::default());
        assert_eq!(output.sort, TagSort::Alpha);
        assert_eq!(names(&output), vec!["ALPHA", "BETA"]);
    }

    #[test]
    fn test_explicit_sorts() {
        let cmd = command(TagSort::Ranked);
        let run = |key: &str| {
            cmd.run(&TagsOptions {
                sort: Some(key.into()),
                ..Default::default()
            })
        };

        // BETA 2 + 3.5 at write time, ALPHA 1 + 3.5
        assert_eq!(names(&run("ranked")), vec!["BETA", "ALPHA"]);
        assert_eq!(names(&run("popular")), vec!["BETA", "ALPHA"]);
        assert_eq!(names(&run("latest")), vec!["ALPHA", "BETA"]);
        assert_eq!(names(&run("oldest")), vec!["BETA", "ALPHA"]);
        assert_eq!(names(&run("ALPHA")), vec!["ALPHA", "BETA"]);
    }

    #[test]
    fn test_unknown_sort_falls_back_to_ranked() {
        let cmd = command(TagSort::Alpha);
        let output = cmd.run(&TagsOptions {
            sort: Some("trending".into()),
            ..Default::default()
        });
        assert_eq!(output.sort, TagSort::Ranked);
        assert_eq!(names(&output), vec!["BETA", "ALPHA"]);
    }

    #[test]
    fn test_limit_and_human_output() {
        let cmd = command(TagSort::Ranked);
        let options = TagsOptions {
            limit: Some(1),
            ..Default::default()
        };
        let output = cmd.run(&options);
        assert_eq!(output.count, 1);

        let human = cmd.format_output(&output, &options);
        assert!(human.starts_with("1 tag(s), sorted by ranked:"));
        assert!(human.contains("BETA"));
        assert!(human.contains("rank    5.50"));
    }

    #[test]
    fn test_json_output() {
        let cmd = command(TagSort::Ranked);
        let options = TagsOptions {
            json: true,
            ..Default::default()
        };
        let output = cmd.run(&options);

        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(parsed["sort"], "ranked");
        assert_eq!(parsed["tags"][0]["tag"], "BETA");
        assert_eq!(parsed["tags"][0]["total_used"], 2);
    }
}
