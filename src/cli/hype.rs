//! Hype command for hypefeed.
//!
//! Toggles one user's hype on a published post.

use serde::Serialize;
use uuid::Uuid;

use crate::content::PostService;
use crate::core::HypeToggle;
use crate::storage::{HypeStore, PostStore, TagStatsStore};

/// Options for the hype command.
#[derive(Debug, Clone, Default)]
pub struct HypeOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Post ID.
    pub id: String,
    /// User doing the hyping.
    pub user: String,
}

/// Output format for the hype command.
#[derive(Debug, Clone, Serialize)]
pub struct HypeOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Uuid>,
    pub hyped: bool,
    pub hype_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HypeOutput {
    pub fn success(post_id: Uuid, toggle: HypeToggle) -> Self {
        Self {
            success: true,
            post_id: Some(post_id),
            hyped: toggle.hyped,
            hype_count: toggle.hype_count,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            post_id: None,
            hyped: false,
            hype_count: 0,
            error: Some(error.into()),
        }
    }
}

/// The hype command implementation.
pub struct HypeCommand<P: PostStore, T: TagStatsStore, H: HypeStore> {
    service: PostService<P, T, H>,
}

impl<P: PostStore, T: TagStatsStore, H: HypeStore> HypeCommand<P, T, H> {
    pub fn new(service: PostService<P, T, H>) -> Self {
        Self { service }
    }

    /// Run the hype command.
    pub fn run(&self, options: &HypeOptions) -> HypeOutput {
        let Ok(id) = Uuid::parse_str(options.id.trim()) else {
            return HypeOutput::failure(format!("invalid post id: {}", options.id));
        };

        match self.service.toggle_hype(&id, &options.user) {
            Ok(toggle) => HypeOutput::success(id, toggle),
            Err(e) => HypeOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &HypeOutput, options: &HypeOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "Hype failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let verb = if output.hyped { "Hyped" } else { "Unhyped" };
        format!("{} post ({} hype(s) now)\n", verb, output.hype_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::core::NewPost;
    use crate::stats::FeedStatsUpdater;
    use crate::storage::{MemoryHypeStore, MemoryPostStore, MemoryTagStatsStore};

    fn command() -> (
        HypeCommand<MemoryPostStore, MemoryTagStatsStore, MemoryHypeStore>,
        Uuid,
    ) {
        let service = PostService::new(
            MemoryPostStore::new(),
            FeedStatsUpdater::new(MemoryTagStatsStore::new()),
            MemoryHypeStore::new(),
            FeedConfig::default(),
        );
        let id = service
            .create(NewPost::text("ada", "hype me"))
            .unwrap()
            .post
            .id;
        (HypeCommand::new(service), id)
    }

    #[test]
    fn test_hype_and_unhype() {
        let (cmd, id) = command();
        let options = HypeOptions {
            id: id.to_string(),
            user: "bob".into(),
            ..Default::default()
        };

        let first = cmd.run(&options);
        assert!(first.success);
        assert!(first.hyped);
        assert_eq!(first.hype_count, 1);
        assert_eq!(
            cmd.format_output(&first, &options),
            "Hyped post (1 hype(s) now)\n"
        );

        let second = cmd.run(&options);
        assert!(!second.hyped);
        assert_eq!(second.hype_count, 0);
        assert!(cmd.format_output(&second, &options).starts_with("Unhyped"));
    }

    #[test]
    fn test_hype_json_output() {
        let (cmd, id) = command();
        let options = HypeOptions {
            json: true,
            id: id.to_string(),
            user: "bob".into(),
            ..Default::default()
        };
        let output = cmd.run(&options);

        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(parsed["hyped"], true);
        assert_eq!(parsed["hype_count"], 1);
        assert_eq!(parsed["post_id"], id.to_string());
    }

    #[test]
    fn test_hype_errors() {
        let (cmd, id) = command();

        let bad_id = cmd.run(&HypeOptions {
            id: "nope".into(),
            user: "bob".into(),
            ..Default::default()
        });
        assert!(bad_id.error.unwrap().starts_with("invalid post id"));

        let missing = cmd.run(&HypeOptions {
            id: Uuid::new_v4().to_string(),
            user: "bob".into(),
            ..Default::default()
        });
        assert!(missing.error.unwrap().starts_with("post not found"));

        let no_user = cmd.run(&HypeOptions {
            id: id.to_string(),
            user: " ".into(),
            ..Default::default()
        });
        assert!(!no_user.success);
        assert!(no_user.error.unwrap().contains("user is required"));
    }
}
