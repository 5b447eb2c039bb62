//! In-memory stores.
//!
//! Used by tests and by embedders that keep state in process. The tag store
//! locks per row: creating a row takes the map write lock, updating one
//! takes only that row's mutex, so distinct tags never wait on each other.
//! Hype toggles are short and take the hype map's write lock.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use crate::core::{HypeToggle, Post, TagStat};
use crate::error::{FeedError, Result};
use crate::storage::{HypeStore, PostStore, TagStatsStore, Upsert};

fn poisoned(what: &str) -> FeedError {
    FeedError::store(format!("{} lock poisoned", what))
}

#[derive(Debug)]
struct Row {
    seq: u64,
    stat: Arc<Mutex<TagStat>>,
}

/// In-memory tag statistics table.
#[derive(Debug, Default)]
pub struct MemoryTagStatsStore {
    rows: RwLock<HashMap<String, Row>>,
    next_seq: AtomicU64,
}

impl MemoryTagStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().map(|r| r.is_empty()).unwrap_or(true)
    }
}

impl TagStatsStore for MemoryTagStatsStore {
    fn get(&self, tag: &str) -> Result<Option<TagStat>> {
        let rows = self.rows.read().map_err(|_| poisoned("tag table"))?;
        match rows.get(tag) {
            Some(row) => {
                let stat = row.stat.lock().map_err(|_| poisoned("tag row"))?;
                Ok(Some(stat.clone()))
            }
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<TagStat>> {
        let rows = self.rows.read().map_err(|_| poisoned("tag table"))?;
        let mut ordered: Vec<(u64, TagStat)> = Vec::with_capacity(rows.len());
        for row in rows.values() {
            let stat = row.stat.lock().map_err(|_| poisoned("tag row"))?;
            ordered.push((row.seq, stat.clone()));
        }
        ordered.sort_by_key(|(seq, _)| *seq);
        Ok(ordered.into_iter().map(|(_, stat)| stat).collect())
    }

    fn upsert(
        &self,
        tag: &str,
        seed: TagStat,
        apply: &mut dyn FnMut(&mut TagStat, Upsert),
    ) -> Result<TagStat> {
        // Fast path: row exists, only its mutex is needed.
        let existing = {
            let rows = self.rows.read().map_err(|_| poisoned("tag table"))?;
            rows.get(tag).map(|row| Arc::clone(&row.stat))
        };

        let row = match existing {
            Some(row) => row,
            None => {
                let mut rows = self.rows.write().map_err(|_| poisoned("tag table"))?;
                let row = match rows.entry(tag.to_string()) {
                    Entry::Occupied(entry) => Arc::clone(&entry.get().stat),
                    Entry::Vacant(entry) => {
                        // The row becomes visible only after the insert branch ran.
                        let mut stat = seed;
                        apply(&mut stat, Upsert::Inserted);
                        let result = stat.clone();
                        entry.insert(Row {
                            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                            stat: Arc::new(Mutex::new(stat)),
                        });
                        return Ok(result);
                    }
                };
                row
            }
        };

        let mut stat = row.lock().map_err(|_| poisoned("tag row"))?;
        apply(&mut *stat, Upsert::Existing);
        Ok(stat.clone())
    }
}

/// In-memory post store.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posts.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PostStore for MemoryPostStore {
    fn get(&self, id: &Uuid) -> Result<Option<Post>> {
        let posts = self.posts.read().map_err(|_| poisoned("post table"))?;
        Ok(posts.get(id).cloned())
    }

    fn put(&self, post: &Post) -> Result<()> {
        let mut posts = self.posts.write().map_err(|_| poisoned("post table"))?;
        posts.insert(post.id, post.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Post>> {
        let posts = self.posts.read().map_err(|_| poisoned("post table"))?;
        Ok(posts.values().cloned().collect())
    }
}

/// In-memory hype pairs, keyed by post.
#[derive(Debug, Default)]
pub struct MemoryHypeStore {
    hypes: RwLock<HashMap<Uuid, HashSet<String>>>,
}

impl MemoryHypeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HypeStore for MemoryHypeStore {
    fn toggle(&self, post_id: &Uuid, user: &str) -> Result<HypeToggle> {
        let mut hypes = self.hypes.write().map_err(|_| poisoned("hype table"))?;
        let users = hypes.entry(*post_id).or_default();
        let hyped = if users.remove(user) {
            false
        } else {
            users.insert(user.to_string());
            true
        };
        let hype_count = users.len() as u64;
        if users.is_empty() {
            hypes.remove(post_id);
        }
        Ok(HypeToggle { hyped, hype_count })
    }

    fn counts(&self) -> Result<HashMap<Uuid, u64>> {
        let hypes = self.hypes.read().map_err(|_| poisoned("hype table"))?;
        Ok(hypes
            .iter()
            .map(|(id, users)| (*id, users.len() as u64))
            .collect())
    }

    fn hyped_by(&self, user: &str) -> Result<HashSet<Uuid>> {
        let hypes = self.hypes.read().map_err(|_| poisoned("hype table"))?;
        Ok(hypes
            .iter()
            .filter(|(_, users)| users.contains(user))
            .map(|(id, _)| *id)
            .collect())
    }

    fn count(&self, post_id: &Uuid) -> Result<u64> {
        let hypes = self.hypes.read().map_err(|_| poisoned("hype table"))?;
        Ok(hypes.get(post_id).map(|u| u.len() as u64).unwrap_or(0))
    }

    fn is_hyped(&self, post_id: &Uuid, user: &str) -> Result<bool> {
        let hypes = self.hypes.read().map_err(|_| poisoned("hype table"))?;
        Ok(hypes.get(post_id).map(|u| u.contains(user)).unwrap_or(false))
    }
}
