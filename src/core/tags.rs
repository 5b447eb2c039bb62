//! Tag statistics rows, listing sort keys, and tag normalization.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Usage statistics for a single normalized tag.
///
/// Rows are created on the first published post carrying the tag and are
/// never deleted. `rank` is a snapshot taken at the last update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagStat {
    /// The normalized (trimmed, upper-case) tag.
    pub tag: String,
    /// Number of distinct new posts that carried this tag.
    pub total_used: u64,
    /// Trending score as of the last update.
    pub rank: f64,
    /// When the tag was first used.
    pub created_at: DateTime<Utc>,
    /// When a published post carrying the tag was last saved.
    pub last_used_at: DateTime<Utc>,
}

impl TagStat {
    /// Build the row for a tag's first use.
    pub fn seeded(tag: impl Into<String>, now: DateTime<Utc>, seed_rank: f64) -> Self {
        Self {
            tag: tag.into(),
            total_used: 1,
            rank: seed_rank,
            created_at: now,
            last_used_at: now,
        }
    }
}

/// Sort order for tag listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSort {
    /// Rank, highest first.
    #[default]
    Ranked,
    /// Tag name, ascending.
    Alpha,
    /// Most recently used first.
    Latest,
    /// First used earliest first.
    Oldest,
    /// Most used first.
    Popular,
}

/// Valid sort key strings.
pub const VALID_SORT_KEYS: &[&str] = &["ranked", "alpha", "latest", "oldest", "popular"];

impl TagSort {
    /// Parse a sort key, case-insensitively.
    ///
    /// Returns `None` for unrecognized keys.
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "ranked" => Some(Self::Ranked),
            "alpha" => Some(Self::Alpha),
            "latest" => Some(Self::Latest),
            "oldest" => Some(Self::Oldest),
            "popular" => Some(Self::Popular),
            _ => None,
        }
    }

    /// Parse a sort key, falling back to [`TagSort::Ranked`] for anything unrecognized.
    pub fn from_key(key: &str) -> Self {
        Self::parse(key).unwrap_or_default()
    }

    /// The key string for this sort order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ranked => "ranked",
            Self::Alpha => "alpha",
            Self::Latest => "latest",
            Self::Oldest => "oldest",
            Self::Popular => "popular",
        }
    }

    /// Sort rows in place. The sort is stable, so ties keep store order.
    pub fn apply(&self, stats: &mut [TagStat]) {
        match self {
            Self::Ranked => stats.sort_by(|a, b| {
                b.rank
                    .partial_cmp(&a.rank)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            Self::Alpha => stats.sort_by(|a, b| a.tag.cmp(&b.tag)),
            Self::Latest => stats.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at)),
            Self::Oldest => stats.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            Self::Popular => stats.sort_by(|a, b| b.total_used.cmp(&a.total_used)),
        }
    }
}

impl fmt::Display for TagSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn hashtag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"#(\w+)").expect("hashtag pattern is valid"))
}

/// Extract `#hashtag` words from free text, upper-cased.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    hashtag_regex()
        .captures_iter(text)
        .map(|cap| cap[1].to_uppercase())
        .collect()
}

/// Normalize a single tag: trim and upper-case. Returns `None` when empty.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Normalize a list of tags: trim, upper-case, drop empties, de-duplicate.
///
/// First occurrence order is preserved.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|t| normalize_tag(t.as_ref()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Split a comma-separated tag filter (`"science, art"`) into normalized tags.
pub fn parse_tag_filter(param: &str) -> Vec<String> {
    normalize_tags(param.split(','))
}
