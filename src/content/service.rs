//! Post authoring.
//!
//! Every write persists the post first and only then fires the publish
//! event. The statistics update is fail-open: a failure is logged and the
//! write still succeeds.
//!
//! Edits of one post are serialized inside the service, so two concurrent
//! edits never overwrite each other with a stale copy. Separate processes
//! editing the same post are not coordinated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::core::{normalize_user, HypeToggle, NewPost, Post, PostEdit};
use crate::error::{FailOpen, FeedError, Result};
use crate::stats::{FeedStatsUpdater, PublishEvent, UpdateSummary};
use crate::storage::{HypeStore, PostStore, TagStatsStore};

/// Result of a post write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostWrite {
    pub post: Post,
    /// `None` when the statistics update failed.
    pub stats: Option<UpdateSummary>,
}

/// One mutex per post id that has been edited.
#[derive(Debug, Clone, Default)]
struct EditLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl EditLocks {
    fn for_post(&self, id: &Uuid) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| FeedError::store("edit lock table poisoned"))?;
        Ok(Arc::clone(locks.entry(*id).or_default()))
    }
}

/// Creates and edits posts, keeping tag statistics in step.
#[derive(Debug, Clone)]
pub struct PostService<P: PostStore, T: TagStatsStore, H: HypeStore> {
    posts: P,
    updater: FeedStatsUpdater<T>,
    hypes: H,
    limits: FeedConfig,
    edit_locks: EditLocks,
}

impl<P: PostStore, T: TagStatsStore, H: HypeStore> PostService<P, T, H> {
    pub fn new(posts: P, updater: FeedStatsUpdater<T>, hypes: H, limits: FeedConfig) -> Self {
        Self {
            posts,
            updater,
            hypes,
            limits,
            edit_locks: EditLocks::default(),
        }
    }

    pub fn posts(&self) -> &P {
        &self.posts
    }

    pub fn hypes(&self) -> &H {
        &self.hypes
    }

    pub fn updater(&self) -> &FeedStatsUpdater<T> {
        &self.updater
    }

    /// Validate, persist, and publish a new post.
    pub fn create(&self, new: NewPost) -> Result<PostWrite> {
        self.create_at(new, Utc::now())
    }

    pub fn create_at(&self, new: NewPost, now: DateTime<Utc>) -> Result<PostWrite> {
        let post = new.into_post(&self.limits, now)?;
        self.posts.put(&post)?;
        tracing::info!(post_id = %post.id, author = %post.author, tags = ?post.tags, "post created");

        let stats = self.publish(&post, true, now);
        Ok(PostWrite { post, stats })
    }

    /// Apply an edit to an existing post and publish it again.
    ///
    /// The event is an edit, so tag usage is not counted a second time.
    pub fn edit(&self, id: &Uuid, edit: PostEdit) -> Result<PostWrite> {
        self.edit_at(id, edit, Utc::now())
    }

    pub fn edit_at(&self, id: &Uuid, edit: PostEdit, now: DateTime<Utc>) -> Result<PostWrite> {
        let lock = self.edit_locks.for_post(id)?;
        let _guard = lock
            .lock()
            .map_err(|_| FeedError::store("post edit lock poisoned"))?;

        let mut post = self
            .posts
            .get(id)?
            .ok_or_else(|| FeedError::post_not_found(id.to_string()))?;

        edit.apply(&mut post, &self.limits, now)?;
        self.posts.put(&post)?;
        tracing::info!(post_id = %post.id, published = post.is_published, "post edited");

        let stats = self.publish(&post, false, now);
        Ok(PostWrite { post, stats })
    }

    /// Publish or unpublish a post.
    pub fn set_published(&self, id: &Uuid, published: bool) -> Result<PostWrite> {
        self.edit(
            id,
            PostEdit {
                is_published: Some(published),
                ..PostEdit::default()
            },
        )
    }

    /// Flip `user`'s hype on a published post.
    ///
    /// Drafts cannot be hyped and report as not found. Hypes never touch
    /// tag statistics.
    pub fn toggle_hype(&self, id: &Uuid, user: &str) -> Result<HypeToggle> {
        let user = normalize_user(user)?;
        match self.posts.get(id)? {
            Some(post) if post.is_published => {}
            _ => return Err(FeedError::post_not_found(id.to_string())),
        }

        let toggle = self.hypes.toggle(id, &user)?;
        tracing::info!(post_id = %id, user = %user, hyped = toggle.hyped, count = toggle.hype_count, "hype toggled");
        Ok(toggle)
    }

    fn publish(&self, post: &Post, created: bool, now: DateTime<Utc>) -> Option<UpdateSummary> {
        self.updater
            .apply_at(&PublishEvent::for_post(post, created), now)
            .map(Some)
            .fail_open_with("tag stats update", None)
    }
}
