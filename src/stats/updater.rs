//! Applies post-publish events to the tag statistics table.
//!
//! This is the only writer of [`TagStat`] rows. Each tag is updated through
//! [`TagStatsStore::upsert`], so the increment and rank recompute happen
//! inside the store's per-tag critical section.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::{Post, TagStat};
use crate::error::{FeedError, Result};
use crate::stats::rank::RankCalculator;
use crate::storage::{TagStatsStore, Upsert};

/// A post was committed in a state that may affect tag statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishEvent {
    /// Post that triggered the event, for logging.
    pub post_id: Option<Uuid>,
    /// Normalized tags carried by the post.
    pub tags: Vec<String>,
    /// `true` for a newly created post, `false` for an edit.
    pub created: bool,
    /// Only published posts touch statistics.
    pub is_published: bool,
}

impl PublishEvent {
    pub fn new(tags: Vec<String>, created: bool, is_published: bool) -> Self {
        Self {
            post_id: None,
            tags,
            created,
            is_published,
        }
    }

    /// Event for a post that was just persisted.
    pub fn for_post(post: &Post, created: bool) -> Self {
        Self {
            post_id: Some(post.id),
            tags: post.tags.clone(),
            created,
            is_published: post.is_published,
        }
    }
}

/// What an event did to the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    /// Tags seen for the first time.
    pub inserted: Vec<String>,
    /// Tags whose existing row was refreshed.
    pub updated: Vec<String>,
    /// The post was unpublished, nothing was touched.
    pub skipped: bool,
}

impl UpdateSummary {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn touched(&self) -> usize {
        self.inserted.len() + self.updated.len()
    }
}

/// Mutates tag statistics in response to publish events.
#[derive(Debug, Clone)]
pub struct FeedStatsUpdater<S: TagStatsStore> {
    store: S,
    calculator: RankCalculator,
}

impl<S: TagStatsStore> FeedStatsUpdater<S> {
    pub fn new(store: S) -> Self {
        Self::with_calculator(store, RankCalculator::default())
    }

    pub fn with_calculator(store: S, calculator: RankCalculator) -> Self {
        Self { store, calculator }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn calculator(&self) -> &RankCalculator {
        &self.calculator
    }

    /// Apply an event at the current time.
    pub fn apply(&self, event: &PublishEvent) -> Result<UpdateSummary> {
        self.apply_at(event, Utc::now())
    }

    /// Apply an event as of `now`.
    ///
    /// Every tag is attempted even if an earlier one fails; the error then
    /// names all failed tags.
    pub fn apply_at(&self, event: &PublishEvent, now: DateTime<Utc>) -> Result<UpdateSummary> {
        if !event.is_published {
            tracing::debug!(
                post_id = ?event.post_id,
                "post not published, tag stats untouched"
            );
            return Ok(UpdateSummary::skipped());
        }

        let mut summary = UpdateSummary::default();
        let mut failed = Vec::new();
        let mut last_error = None;

        for tag in &event.tags {
            match self.update_tag(tag, event.created, now) {
                Ok((stat, Upsert::Inserted)) => {
                    tracing::info!(tag = %tag, rank = stat.rank, "new tag");
                    summary.inserted.push(tag.clone());
                }
                Ok((stat, Upsert::Existing)) => {
                    tracing::debug!(
                        tag = %tag,
                        total_used = stat.total_used,
                        rank = stat.rank,
                        "tag stats updated"
                    );
                    summary.updated.push(tag.clone());
                }
                Err(e) => {
                    tracing::warn!(tag = %tag, error = %e, "tag stats update failed");
                    failed.push(tag.clone());
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(FeedError::stats_update(failed, e.to_string())),
            None => Ok(summary),
        }
    }

    fn update_tag(&self, tag: &str, created: bool, now: DateTime<Utc>) -> Result<(TagStat, Upsert)> {
        let calculator = self.calculator;
        let seed = TagStat::seeded(tag, now, calculator.seed_rank());
        let mut outcome = Upsert::Existing;

        let stat = self.store.upsert(tag, seed, &mut |stat, branch| {
            outcome = branch;
            if branch == Upsert::Existing {
                stat.last_used_at = now;
                if created {
                    stat.total_used += 1;
                }
            }
            stat.rank = calculator.rank(stat.total_used, stat.last_used_at, now);
        })?;

        Ok((stat, outcome))
    }
}
