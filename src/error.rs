//! Unified error types for hypefeed.
//!
//! Post persistence is the primary operation; tag statistics are a side
//! effect. Errors on the statistics path are logged and replaced with safe
//! defaults through [`FailOpen`] instead of failing the originating write.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for hypefeed operations.
#[derive(Error, Debug)]
pub enum FeedError {
    /// I/O errors from file-backed stores.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Store-level failures that are not plain I/O (poisoned locks, corrupt tables).
    #[error("store error: {message}")]
    Store { message: String },

    /// JSON serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Rejected post content or tags.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Post not found in storage.
    #[error("post not found: {post_id}")]
    PostNotFound { post_id: String },

    /// One or more tag rows could not be updated.
    #[error("stats update failed for [{}]: {message}", tags.join(", "))]
    StatsUpdate { tags: Vec<String>, message: String },
}

/// A specialized Result type for hypefeed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

impl FeedError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a post not found error.
    pub fn post_not_found(post_id: impl Into<String>) -> Self {
        Self::PostNotFound {
            post_id: post_id.into(),
        }
    }

    /// Create a stats update error.
    pub fn stats_update(tags: Vec<String>, message: impl Into<String>) -> Self {
        Self::StatsUpdate {
            tags,
            message: message.into(),
        }
    }

    /// Whether the caller made a mistake (as opposed to an infrastructure failure).
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::PostNotFound { .. })
    }
}

impl From<io::Error> for FeedError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Logs the error and substitutes a fallback value. Used where a failure
/// must not propagate to the primary operation.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "{} failed (fail-open: using default)", context);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "{} failed (fail-open: using fallback)", context);
                fallback
            }
        }
    }
}

/// Exit codes for the hypefeed CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command ran but reported a failure.
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = FeedError::storage(
            "/tmp/tags.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/tags.json"));
    }

    #[test]
    fn test_store_error_display() {
        let err = FeedError::store("lock poisoned");
        assert_eq!(err.to_string(), "store error: lock poisoned");
    }

    #[test]
    fn test_validation_error_display() {
        let err = FeedError::validation("A post cannot have more than 10 tags");
        assert_eq!(
            err.to_string(),
            "validation error: A post cannot have more than 10 tags"
        );
    }

    #[test]
    fn test_post_not_found_display() {
        let err = FeedError::post_not_found("abc-123");
        assert_eq!(err.to_string(), "post not found: abc-123");
    }

    #[test]
    fn test_stats_update_display_lists_tags() {
        let err = FeedError::stats_update(
            vec!["SCIENCE".to_string(), "TECH".to_string()],
            "disk full",
        );
        assert_eq!(
            err.to_string(),
            "stats update failed for [SCIENCE, TECH]: disk full"
        );
    }

    #[test]
    fn test_is_user_error() {
        assert!(FeedError::validation("x").is_user_error());
        assert!(FeedError::post_not_found("x").is_user_error());
        assert!(!FeedError::store("x").is_user_error());
        assert!(!FeedError::config("x").is_user_error());
        assert!(!FeedError::stats_update(vec![], "x").is_user_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let feed_err: FeedError = io_err.into();
        assert!(matches!(feed_err, FeedError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let feed_err: FeedError = json_err.into();
        assert!(matches!(feed_err, FeedError::Serde { .. }));
    }

    #[test]
    fn test_fail_open_default() {
        let result: Result<Vec<String>> = Err(FeedError::store("test"));
        let value = result.fail_open_default("test context");
        assert!(value.is_empty());
    }

    #[test]
    fn test_fail_open_with() {
        let result: Result<i32> = Err(FeedError::store("test"));
        let value = result.fail_open_with("test context", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_fail_open_success() {
        let result: Result<i32> = Ok(100);
        let value = result.fail_open_default("test context");
        assert_eq!(value, 100);
    }
}
