//! Tag statistics: the rank formula and the publish-event updater.
//!
//! [`FeedStatsUpdater`] is the only writer of the tag table. Rank is a
//! snapshot taken at each update and goes stale between updates.

pub mod rank;
pub mod updater;

pub use rank::{weights, RankCalculator};
pub use updater::{FeedStatsUpdater, PublishEvent, UpdateSummary};
