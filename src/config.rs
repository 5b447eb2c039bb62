//! Configuration loading for hypefeed.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.hypefeed/config.toml`)
//! 3. User config (`~/.hypefeed/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. With no config at all, ranking uses the
//! stock formula: usage plus half a point per day of recency inside a
//! seven-day window.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::tags::{TagSort, VALID_SORT_KEYS};
use crate::error::{FeedError, Result};
use crate::util::write_atomic;

/// Main configuration struct for hypefeed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tag rank formula parameters.
    pub ranking: RankingConfig,
    /// Feed and authoring limits.
    pub feed: FeedConfig,
    /// Storage locations.
    pub storage: StorageConfig,
}

/// Tag rank formula parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingConfig {
    /// Days over which the recency bonus decays to zero.
    pub recency_window_days: u32,
    /// Bonus per remaining day inside the window.
    pub recency_weight: f64,
    /// Rank written into a tag row at creation, before the first recompute.
    pub seed_rank: f64,
}

impl RankingConfig {
    /// Check if a recency weight is valid (finite and non-negative).
    pub fn is_valid_weight(value: f64) -> bool {
        value.is_finite() && value >= 0.0
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            recency_window_days: 7,
            recency_weight: 0.5,
            seed_rank: 1.0,
        }
    }
}

/// Feed and authoring limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Sort key used when a tag listing does not name one.
    pub default_tag_sort: String,
    /// Maximum distinct tags per post.
    pub max_tags_per_post: usize,
    /// Maximum characters per tag.
    pub max_tag_length: usize,
}

impl FeedConfig {
    /// The configured default sort, with unknown keys falling back to ranked.
    pub fn default_sort(&self) -> TagSort {
        TagSort::from_key(&self.default_tag_sort)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_tag_sort: "ranked".to_string(),
            max_tags_per_post: 10,
            max_tag_length: 20,
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the data directory (defaults to `<home>/data`).
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    fn load_user_config() -> Option<Config> {
        let home = hypefeed_home()?;
        Self::load_optional(&home.join("config.toml"))
    }

    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_optional(&project_config_path(cwd))
    }

    /// A missing file is silent; an unreadable or invalid one is warned about.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    ///
    /// Out-of-range values are warned about and replaced with defaults, the
    /// same way invalid environment overrides are ignored.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| FeedError::storage(path, e))?;
        let mut config: Config =
            toml::from_str(&content).map_err(|e| FeedError::config(e.to_string()))?;
        config.reset_invalid(path);
        Ok(config)
    }

    fn reset_invalid(&mut self, path: &Path) {
        let ranking = RankingConfig::default();
        if !RankingConfig::is_valid_weight(self.ranking.recency_weight) {
            tracing::warn!(
                path = %path.display(),
                value = self.ranking.recency_weight,
                default = ranking.recency_weight,
                "invalid ranking.recency_weight, expected a non-negative number"
            );
            self.ranking.recency_weight = ranking.recency_weight;
        }
        if !self.ranking.seed_rank.is_finite() {
            tracing::warn!(
                path = %path.display(),
                value = self.ranking.seed_rank,
                default = ranking.seed_rank,
                "invalid ranking.seed_rank, expected a finite number"
            );
            self.ranking.seed_rank = ranking.seed_rank;
        }

        let feed = FeedConfig::default();
        if self.feed.max_tags_per_post == 0 {
            tracing::warn!(
                path = %path.display(),
                default = feed.max_tags_per_post,
                "invalid feed.max_tags_per_post, expected a positive integer"
            );
            self.feed.max_tags_per_post = feed.max_tags_per_post;
        }
        if self.feed.max_tag_length == 0 {
            tracing::warn!(
                path = %path.display(),
                default = feed.max_tag_length,
                "invalid feed.max_tag_length, expected a positive integer"
            );
            self.feed.max_tag_length = feed.max_tag_length;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("HYPEFEED_RECENCY_DAYS") {
            match val.parse::<u32>() {
                Ok(n) => self.ranking.recency_window_days = n,
                Err(_) => tracing::warn!(
                    value = %val,
                    default = self.ranking.recency_window_days,
                    "invalid HYPEFEED_RECENCY_DAYS, expected a non-negative integer"
                ),
            }
        }

        if let Ok(val) = env::var("HYPEFEED_RECENCY_WEIGHT") {
            match val.parse::<f64>() {
                Ok(n) if RankingConfig::is_valid_weight(n) => self.ranking.recency_weight = n,
                _ => tracing::warn!(
                    value = %val,
                    default = self.ranking.recency_weight,
                    "invalid HYPEFEED_RECENCY_WEIGHT, expected a non-negative number"
                ),
            }
        }

        if let Ok(val) = env::var("HYPEFEED_DEFAULT_SORT") {
            if TagSort::parse(&val).is_some() {
                self.feed.default_tag_sort = val.trim().to_lowercase();
            } else {
                tracing::warn!(
                    value = %val,
                    valid = ?VALID_SORT_KEYS,
                    "invalid HYPEFEED_DEFAULT_SORT, keeping '{}'",
                    self.feed.default_tag_sort
                );
            }
        }

        if let Ok(val) = env::var("HYPEFEED_MAX_TAGS") {
            match val.parse::<usize>() {
                Ok(n) if n >= 1 => self.feed.max_tags_per_post = n,
                _ => tracing::warn!(
                    value = %val,
                    default = self.feed.max_tags_per_post,
                    "invalid HYPEFEED_MAX_TAGS, expected a positive integer"
                ),
            }
        }

        if let Ok(val) = env::var("HYPEFEED_DATA_DIR") {
            if val.trim().is_empty() {
                tracing::warn!("HYPEFEED_DATA_DIR is empty, ignoring");
            } else {
                self.storage.data_dir = Some(PathBuf::from(val));
            }
        }
    }

    /// Merge another config into this one, field by field.
    ///
    /// Non-default values in `other` win. A layer cannot reset a value back
    /// to its default once a lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_ranking = RankingConfig::default();
        if other.ranking.recency_window_days != default_ranking.recency_window_days {
            self.ranking.recency_window_days = other.ranking.recency_window_days;
        }
        if other.ranking.recency_weight != default_ranking.recency_weight {
            self.ranking.recency_weight = other.ranking.recency_weight;
        }
        if other.ranking.seed_rank != default_ranking.seed_rank {
            self.ranking.seed_rank = other.ranking.seed_rank;
        }

        let default_feed = FeedConfig::default();
        if other.feed.default_tag_sort != default_feed.default_tag_sort {
            self.feed.default_tag_sort = other.feed.default_tag_sort;
        }
        if other.feed.max_tags_per_post != default_feed.max_tags_per_post {
            self.feed.max_tags_per_post = other.feed.max_tags_per_post;
        }
        if other.feed.max_tag_length != default_feed.max_tag_length {
            self.feed.max_tag_length = other.feed.max_tag_length;
        }

        if other.storage.data_dir.is_some() {
            self.storage.data_dir = other.storage.data_dir;
        }

        self
    }

    /// Directory holding the tag table and post files.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage
            .data_dir
            .clone()
            .or_else(|| hypefeed_home().map(|h| h.join("data")))
    }

    /// Save configuration to the project config file.
    ///
    /// Writes `.hypefeed/config.toml` under `cwd` via temp file + rename.
    pub fn save_project(&self, cwd: &Path) -> Result<PathBuf> {
        let dir = cwd.join(".hypefeed");
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| FeedError::storage(&dir, e))?;
        }

        let config_path = dir.join("config.toml");
        let content =
            toml::to_string_pretty(self).map_err(|e| FeedError::config(e.to_string()))?;

        write_atomic(&config_path, content.as_bytes())?;
        Ok(config_path)
    }
}

/// Get the hypefeed home directory.
///
/// `HYPEFEED_HOME` wins when set and non-empty; otherwise `~/.hypefeed`.
pub fn hypefeed_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("HYPEFEED_HOME") {
        if home.is_empty() {
            tracing::warn!("HYPEFEED_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("HYPEFEED_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".hypefeed"));
    }

    let fallback_path = fallback_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

#[cfg(unix)]
fn fallback_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/hypefeed-{}", uid))
}

#[cfg(not(unix))]
fn fallback_home() -> PathBuf {
    std::env::temp_dir().join("hypefeed")
}

/// Project config path for a working directory.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(".hypefeed").join("config.toml")
}

/// Tag statistics table inside a data directory.
pub fn tag_stats_path(data_dir: &Path) -> PathBuf {
    data_dir.join("tags.json")
}

/// Hype table inside a data directory.
pub fn hypes_path(data_dir: &Path) -> PathBuf {
    data_dir.join("hypes.json")
}

/// Post files directory inside a data directory.
pub fn posts_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("posts")
}
