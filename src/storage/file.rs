//! File-backed stores.
//!
//! The tag table is a single JSON array (`tags.json`, insertion order).
//! Every upsert holds an exclusive `fs2` lock on `tags.lock` across the
//! read-modify-write, so increments are serialized between threads and
//! between processes sharing the data directory. That one lock covers the
//! whole table: updates to different tags wait on each other, and `get`
//! parses the full table under a shared lock to find its row. Tables are
//! read without the per-file size cap because rows are never pruned.
//!
//! Hypes live in `hypes.json` (post id to users) under the same locking
//! scheme. Posts are stored one JSON file per post under `posts/`. Every
//! write goes through temp file + rename.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{hypes_path, posts_dir, tag_stats_path};
use crate::core::{HypeToggle, Post, TagStat};
use crate::error::{FeedError, Result};
use crate::storage::{HypeStore, PostStore, TagStatsStore, Upsert};
use crate::util::{read_to_string_limited, write_atomic};

/// A JSON document guarded by an advisory lock file beside it.
#[derive(Debug, Clone)]
struct LockedTable {
    path: PathBuf,
    lock_path: PathBuf,
}

impl LockedTable {
    fn open(data_dir: &Path, path: PathBuf) -> Result<Self> {
        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(|e| FeedError::storage(data_dir, e))?;
        }
        Ok(Self {
            lock_path: path.with_extension("lock"),
            path,
        })
    }

    fn lock_file(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| FeedError::storage(&self.lock_path, e))
    }

    /// Run `f` holding the shared lock.
    fn shared<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let lock = self.lock_file()?;
        lock.lock_shared()
            .map_err(|e| FeedError::storage(&self.lock_path, e))?;
        let result = f();
        let _ = lock.unlock();
        result
    }

    /// Run `f` holding the exclusive lock.
    fn exclusive<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let lock = self.lock_file()?;
        lock.lock_exclusive()
            .map_err(|e| FeedError::storage(&self.lock_path, e))?;
        let result = f();
        let _ = lock.unlock();
        result
    }

    /// Missing or blank files read as the empty table.
    fn read<T: DeserializeOwned + Default>(&self) -> Result<T> {
        if !self.path.exists() {
            return Ok(T::default());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| FeedError::storage(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            FeedError::store(format!("corrupt table {}: {}", self.path.display(), e))
        })
    }

    fn write<T: Serialize + ?Sized>(&self, table: &T) -> Result<()> {
        let json = serde_json::to_vec(table)?;
        write_atomic(&self.path, &json)
    }
}

/// File-backed tag statistics table.
#[derive(Debug, Clone)]
pub struct FileTagStatsStore {
    table: LockedTable,
}

impl FileTagStatsStore {
    /// Open the table inside a data directory, creating the directory if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            table: LockedTable::open(data_dir, tag_stats_path(data_dir))?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.table.path
    }
}

impl TagStatsStore for FileTagStatsStore {
    fn get(&self, tag: &str) -> Result<Option<TagStat>> {
        Ok(self.list()?.into_iter().find(|s| s.tag == tag))
    }

    fn list(&self) -> Result<Vec<TagStat>> {
        self.table.shared(|| self.table.read())
    }

    fn upsert(
        &self,
        tag: &str,
        seed: TagStat,
        apply: &mut dyn FnMut(&mut TagStat, Upsert),
    ) -> Result<TagStat> {
        self.table.exclusive(|| {
            let mut rows: Vec<TagStat> = self.table.read()?;
            let updated = match rows.iter_mut().find(|s| s.tag == tag) {
                Some(stat) => {
                    apply(stat, Upsert::Existing);
                    stat.clone()
                }
                None => {
                    let mut stat = seed;
                    apply(&mut stat, Upsert::Inserted);
                    rows.push(stat.clone());
                    stat
                }
            };
            self.table.write(&rows)?;
            Ok(updated)
        })
    }
}

/// File-backed hype table.
#[derive(Debug, Clone)]
pub struct FileHypeStore {
    table: LockedTable,
}

type HypeTable = BTreeMap<Uuid, Vec<String>>;

impl FileHypeStore {
    /// Open the table inside a data directory, creating the directory if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            table: LockedTable::open(data_dir, hypes_path(data_dir))?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.table.path
    }

    fn read_shared(&self) -> Result<HypeTable> {
        self.table.shared(|| self.table.read())
    }
}

impl HypeStore for FileHypeStore {
    fn toggle(&self, post_id: &Uuid, user: &str) -> Result<HypeToggle> {
        self.table.exclusive(|| {
            let mut table: HypeTable = self.table.read()?;
            let users = table.entry(*post_id).or_default();
            let hyped = match users.iter().position(|u| u == user) {
                Some(i) => {
                    users.remove(i);
                    false
                }
                None => {
                    users.push(user.to_string());
                    true
                }
            };
            let hype_count = users.len() as u64;
            if users.is_empty() {
                table.remove(post_id);
            }
            self.table.write(&table)?;
            Ok(HypeToggle { hyped, hype_count })
        })
    }

    fn counts(&self) -> Result<HashMap<Uuid, u64>> {
        Ok(self
            .read_shared()?
            .into_iter()
            .map(|(id, users)| (id, users.len() as u64))
            .collect())
    }

    fn hyped_by(&self, user: &str) -> Result<HashSet<Uuid>> {
        Ok(self
            .read_shared()?
            .into_iter()
            .filter(|(_, users)| users.iter().any(|u| u == user))
            .map(|(id, _)| id)
            .collect())
    }
}

/// File-backed post store, one JSON file per post.
#[derive(Debug, Clone)]
pub struct FilePostStore {
    posts_dir: PathBuf,
}

impl FilePostStore {
    /// Open the post directory inside a data directory, creating it if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        Self::with_dir(posts_dir(data_dir))
    }

    /// Use a specific directory for post files.
    pub fn with_dir(posts_dir: impl Into<PathBuf>) -> Result<Self> {
        let posts_dir = posts_dir.into();
        if !posts_dir.exists() {
            fs::create_dir_all(&posts_dir).map_err(|e| FeedError::storage(&posts_dir, e))?;
        }
        Ok(Self { posts_dir })
    }

    fn post_path(&self, id: &Uuid) -> PathBuf {
        self.posts_dir.join(format!("{}.json", id))
    }
}

impl PostStore for FilePostStore {
    fn get(&self, id: &Uuid) -> Result<Option<Post>> {
        let path = self.post_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = read_to_string_limited(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn put(&self, post: &Post) -> Result<()> {
        let json = serde_json::to_string_pretty(post)?;
        write_atomic(&self.post_path(&post.id), json.as_bytes())
    }

    fn list(&self) -> Result<Vec<Post>> {
        if !self.posts_dir.exists() {
            return Ok(Vec::new());
        }

        let entries =
            fs::read_dir(&self.posts_dir).map_err(|e| FeedError::storage(&self.posts_dir, e))?;

        let mut posts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FeedError::storage(&self.posts_dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
            {
                continue;
            }

            match read_to_string_limited(&path)
                .and_then(|content| serde_json::from_str::<Post>(&content).map_err(Into::into))
            {
                Ok(post) => posts.push(post),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable post file");
                }
            }
        }

        Ok(posts)
    }
}
