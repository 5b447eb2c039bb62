//! Storage traits for hypefeed.
//!
//! [`TagStatsStore`] holds the tag statistics table and exposes an atomic
//! read-modify-write primitive. [`PostStore`] holds post records and
//! [`HypeStore`] the `(user, post)` hype pairs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::core::{HypeToggle, Post, TagStat};
use crate::error::Result;

/// Which branch of an upsert ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The row did not exist and was created from the seed.
    Inserted,
    /// The row already existed.
    Existing,
}

/// Trait for tag statistics backends.
///
/// Rows are keyed by normalized tag and never deleted.
pub trait TagStatsStore: Send + Sync {
    /// Retrieve a row by tag.
    ///
    /// Returns `Ok(None)` if the tag has never been used.
    fn get(&self, tag: &str) -> Result<Option<TagStat>>;

    /// List all rows in insertion order.
    fn list(&self) -> Result<Vec<TagStat>>;

    /// Atomically create-or-update the row for `tag`.
    ///
    /// If the row is missing, `seed` becomes the row. `apply` then runs on
    /// the row while no other upsert of the same tag can observe or modify
    /// it, and the result is persisted. Returns the stored row.
    fn upsert(
        &self,
        tag: &str,
        seed: TagStat,
        apply: &mut dyn FnMut(&mut TagStat, Upsert),
    ) -> Result<TagStat>;

    /// Number of rows.
    fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }
}

/// Trait for post storage backends.
pub trait PostStore: Send + Sync {
    /// Retrieve a post by ID.
    ///
    /// Returns `Ok(None)` if the post doesn't exist.
    fn get(&self, id: &Uuid) -> Result<Option<Post>>;

    /// Save a post, creating or replacing it.
    fn put(&self, post: &Post) -> Result<()>;

    /// List all posts, in no particular order.
    fn list(&self) -> Result<Vec<Post>>;

    /// Check if a post exists.
    fn exists(&self, id: &Uuid) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// Trait for hype backends.
///
/// Each `(user, post)` pair is either hyped or not; there are no duplicates.
pub trait HypeStore: Send + Sync {
    /// Atomically flip `user`'s hype on a post.
    ///
    /// Returns the pair's new state and the post's count, both read inside
    /// the same critical section as the flip.
    fn toggle(&self, post_id: &Uuid, user: &str) -> Result<HypeToggle>;

    /// Hype counts for every post with at least one hype.
    fn counts(&self) -> Result<HashMap<Uuid, u64>>;

    /// Posts the user currently hypes.
    fn hyped_by(&self, user: &str) -> Result<HashSet<Uuid>>;

    /// Hypes on one post.
    fn count(&self, post_id: &Uuid) -> Result<u64> {
        Ok(self.counts()?.get(post_id).copied().unwrap_or(0))
    }

    /// Whether `user` hypes the post.
    fn is_hyped(&self, post_id: &Uuid, user: &str) -> Result<bool> {
        Ok(self.hyped_by(user)?.contains(post_id))
    }
}

impl<T: TagStatsStore + ?Sized> TagStatsStore for Arc<T> {
    fn get(&self, tag: &str) -> Result<Option<TagStat>> {
        (**self).get(tag)
    }

    fn list(&self) -> Result<Vec<TagStat>> {
        (**self).list()
    }

    fn upsert(
        &self,
        tag: &str,
        seed: TagStat,
        apply: &mut dyn FnMut(&mut TagStat, Upsert),
    ) -> Result<TagStat> {
        (**self).upsert(tag, seed, apply)
    }
}

impl<T: PostStore + ?Sized> PostStore for Arc<T> {
    fn get(&self, id: &Uuid) -> Result<Option<Post>> {
        (**self).get(id)
    }

    fn put(&self, post: &Post) -> Result<()> {
        (**self).put(post)
    }

    fn list(&self) -> Result<Vec<Post>> {
        (**self).list()
    }
}

impl<T: HypeStore + ?Sized> HypeStore for Arc<T> {
    fn toggle(&self, post_id: &Uuid, user: &str) -> Result<HypeToggle> {
        (**self).toggle(post_id, user)
    }

    fn counts(&self) -> Result<HashMap<Uuid, u64>> {
        (**self).counts()
    }

    fn hyped_by(&self, user: &str) -> Result<HashSet<Uuid>> {
        (**self).hyped_by(user)
    }

    fn count(&self, post_id: &Uuid) -> Result<u64> {
        (**self).count(post_id)
    }

    fn is_hyped(&self, post_id: &Uuid, user: &str) -> Result<bool> {
        (**self).is_hyped(post_id, user)
    }
}
