//! Init command for hypefeed.
//!
//! Writes a default project config and creates the data directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{posts_dir, project_config_path};
use crate::util::write_atomic;

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Overwrite an existing project config.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    pub success: bool,
    /// Paths created.
    pub created: Vec<String>,
    /// Paths that already existed.
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    pub fn success(created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: true,
            created,
            skipped,
            error: None,
        }
    }

    /// Failure that still reports what was created before it.
    pub fn failure(error: impl Into<String>, created: Vec<String>, skipped: Vec<String>) -> Self {
        Self {
            success: false,
            created,
            skipped,
            error: Some(error.into()),
        }
    }
}

/// Default project config.toml content.
const DEFAULT_CONFIG: &str = r#"# hypefeed configuration
#
# Values here override ~/.hypefeed/config.toml and are overridden by
# HYPEFEED_* environment variables.

# Tag rank = total_used + max(0, recency_window_days - days_since_last_used) * recency_weight
[ranking]
recency_window_days = 7
recency_weight = 0.5
seed_rank = 1.0

# default_tag_sort: "ranked", "alpha", "latest", "oldest", or "popular"
[feed]
default_tag_sort = "ranked"
max_tags_per_post = 10
max_tag_length = 20

# Uncomment to keep data somewhere other than ~/.hypefeed/data
[storage]
# data_dir = "/var/lib/hypefeed"
"#;

/// The init command implementation.
pub struct InitCommand {
    cwd: PathBuf,
    data_dir: Option<PathBuf>,
}

impl InitCommand {
    pub fn new(cwd: impl Into<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            data_dir,
        }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        let mut created = Vec::new();
        let mut skipped = Vec::new();

        let config_path = project_config_path(&self.cwd);
        if let Some(dir) = config_path.parent() {
            if let Err(e) = ensure_dir(dir) {
                return InitOutput::failure(e, created, skipped);
            }
        }
        match ensure_file(&config_path, DEFAULT_CONFIG, options.force) {
            Ok(true) => created.push(config_path.display().to_string()),
            Ok(false) => skipped.push(config_path.display().to_string()),
            Err(e) => return InitOutput::failure(e, created, skipped),
        }

        let Some(data_dir) = &self.data_dir else {
            return InitOutput::failure("no data directory available", created, skipped);
        };
        for dir in [data_dir.clone(), posts_dir(data_dir)] {
            match ensure_dir(&dir) {
                Ok(true) => created.push(dir.display().to_string()),
                Ok(false) => skipped.push(dir.display().to_string()),
                Err(e) => return InitOutput::failure(e, created, skipped),
            }
        }

        tracing::debug!(created = created.len(), skipped = skipped.len(), "init finished");
        InitOutput::success(created, skipped)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &InitOutput) -> String {
        let mut lines = Vec::new();

        if !output.success {
            lines.push(format!(
                "Init failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            ));
            if !output.created.is_empty() {
                lines.push("Created before failure:".to_string());
                lines.extend(output.created.iter().map(|p| format!("  {}", p)));
            }
            return lines.join("\n") + "\n";
        }

        if output.created.is_empty() {
            return "hypefeed already initialized.\n".to_string();
        }

        lines.push("Created:".to_string());
        lines.extend(output.created.iter().map(|p| format!("  {}", p)));
        if !output.skipped.is_empty() {
            lines.push("Already exists (skipped):".to_string());
            lines.extend(output.skipped.iter().map(|p| format!("  {}", p)));
        }
        lines.push(String::new());
        lines.push("hypefeed initialized.".to_string());

        lines.join("\n") + "\n"
    }
}

/// Returns Ok(true) if created, Ok(false) if it already existed.
fn ensure_dir(path: &Path) -> Result<bool, String> {
    if path.exists() {
        if path.is_dir() {
            return Ok(false);
        }
        return Err(format!("{} exists but is not a directory", path.display()));
    }

    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))?;
    Ok(true)
}

/// Returns Ok(true) if written, Ok(false) if it already existed.
fn ensure_file(path: &Path, content: &str, force: bool) -> Result<bool, String> {
    if path.exists() && !force {
        return Ok(false);
    }

    write_atomic(path, content.as_bytes()).map_err(|e| e.to_string())?;
    Ok(true)
}
