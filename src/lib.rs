//! hypefeed - tag ranking and feed aggregation for a social backend
//!
//! Posts carry normalized tags. Every save of a published post fires a
//! publish event; [`FeedStatsUpdater`] turns those events into per-tag usage
//! statistics with a recency-weighted rank, and [`FeedQueryService`] serves
//! ranked tag listings and tag-filtered feeds. Users hype posts through
//! [`PostService`]; hype counts travel with every listed post.

pub mod cli;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod feed;
pub mod stats;
pub mod storage;
pub mod util;

pub use config::Config;
pub use content::{PostService, PostWrite};
pub use core::{ContentType, HypeToggle, HypedPost, NewPost, Post, PostEdit, TagSort, TagStat};
pub use error::{FailOpen, FeedError, Result};
pub use feed::FeedQueryService;
pub use stats::{FeedStatsUpdater, PublishEvent, RankCalculator, UpdateSummary};
pub use storage::{
    FileHypeStore, FilePostStore, FileTagStatsStore, HypeStore, MemoryHypeStore, MemoryPostStore,
    MemoryTagStatsStore, PostStore, TagStatsStore, Upsert,
};

// CLI commands
pub use cli::{
    EditCommand, FeedCommand, HypeCommand, InitCommand, PostCommand, ShowCommand, TagsCommand,
};
