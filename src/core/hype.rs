//! Hypes: one user's upvote on one post.
//!
//! A user holds at most one hype per post. Hyping again removes it.

use serde::Serialize;

use crate::core::Post;
use crate::error::{FeedError, Result};

/// State of a `(user, post)` pair after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HypeToggle {
    /// Whether the user now hypes the post.
    pub hyped: bool,
    /// Hypes on the post after the toggle.
    pub hype_count: u64,
}

/// A post as listed in a feed, with its hype totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypedPost {
    #[serde(flatten)]
    pub post: Post,
    pub hype_count: u64,
    /// Whether the viewing user hypes this post. `None` without a viewer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hyped: Option<bool>,
}

/// Trim a user handle, rejecting blanks.
pub fn normalize_user(user: &str) -> Result<String> {
    let user = user.trim();
    if user.is_empty() {
        return Err(FeedError::validation("A user is required to hype a post."));
    }
    Ok(user.to_string())
}
