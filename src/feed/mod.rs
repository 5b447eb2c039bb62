//! Read side: tag rankings and post feeds.

pub mod query;

pub use query::FeedQueryService;
