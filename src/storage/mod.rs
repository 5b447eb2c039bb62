//! Storage for tag statistics, posts, and hypes.
//!
//! Every store has file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::{FileHypeStore, FilePostStore, FileTagStatsStore};
pub use memory::{MemoryHypeStore, MemoryPostStore, MemoryTagStatsStore};
pub use traits::{HypeStore, PostStore, TagStatsStore, Upsert};
