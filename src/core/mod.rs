//! Core domain types for hypefeed.
//!
//! Posts (authored content carrying tags), hypes, and tag statistics rows,
//! plus the normalization rules that connect them.

pub mod hype;
pub mod post;
pub mod tags;

pub use hype::{normalize_user, HypeToggle, HypedPost};
pub use post::{assemble_tags, ContentType, NewPost, Post, PostEdit};
pub use tags::{
    extract_hashtags, normalize_tag, normalize_tags, parse_tag_filter, TagSort, TagStat,
    VALID_SORT_KEYS,
};
