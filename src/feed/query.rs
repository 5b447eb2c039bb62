//! Tag and post listings.
//!
//! Every query reads straight from the stores, so results reflect the
//! latest committed rows. There is no cache to invalidate.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::core::{normalize_tags, HypedPost, Post, TagSort, TagStat};
use crate::error::Result;
use crate::storage::{HypeStore, PostStore, TagStatsStore};

/// Read-only queries over tag statistics, posts, and hypes.
#[derive(Debug, Clone)]
pub struct FeedQueryService<T: TagStatsStore, P: PostStore, H: HypeStore> {
    tags: T,
    posts: P,
    hypes: H,
}

/// Newest first; equal timestamps fall back to id for a stable order.
fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

impl<T: TagStatsStore, P: PostStore, H: HypeStore> FeedQueryService<T, P, H> {
    pub fn new(tags: T, posts: P, hypes: H) -> Self {
        Self { tags, posts, hypes }
    }

    /// All tag rows in the given order. Ties keep insertion order.
    pub fn list_tags(&self, sort: TagSort) -> Result<Vec<TagStat>> {
        let mut stats = self.tags.list()?;
        sort.apply(&mut stats);
        Ok(stats)
    }

    /// Like [`list_tags`](Self::list_tags) with a string key.
    ///
    /// Unknown keys sort by rank.
    pub fn list_tags_by_key(&self, key: &str) -> Result<Vec<TagStat>> {
        self.list_tags(TagSort::from_key(key))
    }

    /// Published posts carrying any of `requested`, newest first.
    ///
    /// Requested tags are trimmed and upper-cased. If nothing usable is
    /// requested, every published post is returned.
    pub fn list_posts_by_tags<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<Post>> {
        let wanted = normalize_tags(requested.iter().map(|s| s.as_ref()));
        let mut posts: Vec<Post> = self
            .posts
            .list()?
            .into_iter()
            .filter(|p| p.is_published)
            .filter(|p| wanted.is_empty() || p.has_any_tag(&wanted))
            .collect();
        posts.sort_by(newest_first);

        tracing::debug!(filter = ?wanted, matched = posts.len(), "listed posts by tags");
        Ok(posts)
    }

    /// Every published post, newest first.
    pub fn list_feed(&self) -> Result<Vec<Post>> {
        self.list_posts_by_tags::<&str>(&[])
    }

    /// A single post, hidden unless published.
    pub fn get_post(&self, id: &Uuid) -> Result<Option<Post>> {
        Ok(self.posts.get(id)?.filter(|p| p.is_published))
    }

    /// One author's posts, newest first.
    ///
    /// Drafts are included only for the author's own view.
    pub fn list_author_posts(&self, author: &str, include_unpublished: bool) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .posts
            .list()?
            .into_iter()
            .filter(|p| p.author == author)
            .filter(|p| include_unpublished || p.is_published)
            .collect();
        posts.sort_by(newest_first);
        Ok(posts)
    }

    /// Attach hype counts, and the viewer's own hype state if given.
    ///
    /// Order is kept. The hype table is read once for the whole listing.
    pub fn with_hypes(&self, posts: Vec<Post>, viewer: Option<&str>) -> Result<Vec<HypedPost>> {
        let counts = self.hypes.counts()?;
        let hyped = match viewer.map(str::trim).filter(|v| !v.is_empty()) {
            Some(user) => Some(self.hypes.hyped_by(user)?),
            None => None,
        };

        Ok(posts
            .into_iter()
            .map(|post| HypedPost {
                hype_count: counts.get(&post.id).copied().unwrap_or(0),
                is_hyped: hyped.as_ref().map(|set| set.contains(&post.id)),
                post,
            })
            .collect())
    }
}
