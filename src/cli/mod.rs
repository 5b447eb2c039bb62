//! CLI commands for hypefeed.
//!
//! Each command follows the same shape: an `*Options` struct from the
//! argument parser, a serializable `*Output`, and a command struct with
//! `run` and `format_output` (human, `--json`, or `--quiet`).
//!
//! - **Authoring**: post, edit
//! - **Interaction**: hype
//! - **Reading**: show, feed, tags
//! - **Utility**: init

// Authoring
pub mod edit;
pub mod post;

// Interaction
pub mod hype;

// Reading
pub mod feed;
pub mod show;
pub mod tags;

// Utility
pub mod init;

pub use edit::EditCommand;
pub use feed::FeedCommand;
pub use hype::HypeCommand;
pub use init::InitCommand;
pub use post::PostCommand;
pub use show::ShowCommand;
pub use tags::TagsCommand;

use crate::core::{HypedPost, Post};

/// Render a post as indented human-readable lines.
pub(crate) fn format_post(post: &Post) -> Vec<String> {
    let mut lines = Vec::new();
    let status = if post.is_published { "" } else { " (draft)" };
    lines.push(format!(
        "[{}] {} by {}{}",
        post.content_type, post.id, post.author, status
    ));
    if !post.text_content.is_empty() {
        lines.push(format!("   {}", post.text_content));
    }
    if let Some(media) = &post.media_file {
        lines.push(format!("   Media: {}", media));
    }
    if !post.description.is_empty() {
        lines.push(format!("   Description: {}", post.description));
    }
    if !post.tags.is_empty() {
        lines.push(format!("   Tags: {}", post.tags.join(", ")));
    }
    lines.push(format!(
        "   Created: {}",
        post.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    lines
}

/// Render the hype line for a listed post.
pub(crate) fn format_hypes(item: &HypedPost) -> String {
    let mine = if item.is_hyped == Some(true) {
        " (hyped)"
    } else {
        ""
    };
    format!("   Hypes: {}{}", item.hype_count, mine)
}
