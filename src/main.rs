//! hypefeed - tag ranking and feed aggregation
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hypefeed::config::{hypefeed_home, Config};
use hypefeed::content::PostService;
use hypefeed::core::ContentType;
use hypefeed::error::exit_codes;
use hypefeed::feed::FeedQueryService;
use hypefeed::stats::{FeedStatsUpdater, RankCalculator};
use hypefeed::storage::{FileHypeStore, FilePostStore, FileTagStatsStore};

// =============================================================================
// CLI Definition
// =============================================================================

/// hypefeed - tag ranking and feed aggregation
#[derive(Parser)]
#[command(name = "hypefeed")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default project config and create the data directory
    Init {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Suppress output
        #[arg(long, short)]
        quiet: bool,

        /// Overwrite an existing project config
        #[arg(long)]
        force: bool,
    },

    /// Create a post
    Post {
        /// Author handle
        #[arg(long)]
        author: String,

        /// Content type
        #[arg(long = "type", value_enum, default_value = "text")]
        content_type: ContentTypeArg,

        /// Post text (hashtags become tags)
        #[arg(long)]
        text: Option<String>,

        /// Media reference for image and video posts
        #[arg(long)]
        media: Option<String>,

        /// Description or caption (hashtags become tags)
        #[arg(long)]
        description: Option<String>,

        /// Explicit tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Save without publishing
        #[arg(long)]
        draft: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Edit a post
    Edit {
        /// Post ID
        id: String,

        /// Replacement text
        #[arg(long)]
        text: Option<String>,

        /// Replacement description
        #[arg(long)]
        description: Option<String>,

        /// Replacement tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Publish the post
        #[arg(long, conflicts_with = "unpublish")]
        publish: bool,

        /// Unpublish the post
        #[arg(long)]
        unpublish: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Toggle a user's hype on a published post
    Hype {
        /// Post ID
        id: String,

        /// User doing the hyping
        #[arg(long)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show a published post
    Show {
        /// Post ID
        id: String,

        /// Mark whether this user hypes the post
        #[arg(long)]
        viewer: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List published posts, newest first
    Feed {
        /// Comma-separated tags; posts matching any are shown
        #[arg(long)]
        tags: Option<String>,

        /// Only this author's posts
        #[arg(long)]
        author: Option<String>,

        /// With --author, include drafts
        #[arg(long, requires = "author")]
        include_drafts: bool,

        /// Maximum number of posts
        #[arg(long, short)]
        limit: Option<usize>,

        /// Mark which posts this user hypes
        #[arg(long)]
        viewer: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List tags with their statistics
    Tags {
        /// Sort order: ranked, alpha, latest, oldest, popular
        #[arg(long, short)]
        sort: Option<String>,

        /// Maximum number of tags
        #[arg(long, short)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

/// Content type argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ContentTypeArg {
    Text,
    Image,
    Video,
}

impl From<ContentTypeArg> for ContentType {
    fn from(arg: ContentTypeArg) -> Self {
        match arg {
            ContentTypeArg::Text => ContentType::Text,
            ContentTypeArg::Image => ContentType::Image,
            ContentTypeArg::Video => ContentType::Video,
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("hypefeed error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Log to stderr so `--json` output on stdout stays parseable.
///
/// Filtered by `RUST_LOG`, warnings only when it is unset or invalid, so
/// fail-open stats warnings always reach the terminal.
fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Set up the global panic handler.
///
/// On panic, appends to `<home>/crash.log` and exits with the crash code.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("hypefeed panic: {}", info);

        if let Some(home) = hypefeed_home() {
            let _ = std::fs::create_dir_all(&home);
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config = Config::load_from_cwd(&cwd);

    match cli.command {
        Commands::Init { json, quiet, force } => run_init(json, quiet, force, &cwd, &config),
        Commands::Post {
            author,
            content_type,
            text,
            media,
            description,
            tags,
            draft,
            json,
            quiet,
        } => {
            use hypefeed::cli::post::{PostCommand, PostOptions};

            let cmd = PostCommand::new(post_service(&config)?);
            let options = PostOptions {
                json,
                quiet,
                author,
                content_type: content_type.into(),
                text,
                media,
                description,
                tags,
                draft,
            };
            let output = cmd.run(&options);
            print_output(&cmd.format_output(&output, &options));
            Ok(success_to_exit_code(output.success))
        }
        Commands::Edit {
            id,
            text,
            description,
            tags,
            publish,
            unpublish,
            json,
            quiet,
        } => {
            use hypefeed::cli::edit::{EditCommand, EditOptions};

            let cmd = EditCommand::new(post_service(&config)?);
            let options = EditOptions {
                json,
                quiet,
                id,
                text,
                description,
                tags,
                publish: publish_flag(publish, unpublish),
            };
            let output = cmd.run(&options);
            print_output(&cmd.format_output(&output, &options));
            Ok(success_to_exit_code(output.success))
        }
        Commands::Hype {
            id,
            user,
            json,
            quiet,
        } => {
            use hypefeed::cli::hype::{HypeCommand, HypeOptions};

            let cmd = HypeCommand::new(post_service(&config)?);
            let options = HypeOptions {
                json,
                quiet,
                id,
                user,
            };
            let output = cmd.run(&options);
            print_output(&cmd.format_output(&output, &options));
            Ok(success_to_exit_code(output.success))
        }
        Commands::Show {
            id,
            viewer,
            json,
            quiet,
        } => {
            use hypefeed::cli::show::{ShowCommand, ShowOptions};

            let cmd = ShowCommand::new(query_service(&config)?);
            let options = ShowOptions {
                json,
                quiet,
                id,
                viewer,
            };
            let output = cmd.run(&options);
            print_output(&cmd.format_output(&output, &options));
            Ok(success_to_exit_code(output.success))
        }
        Commands::Feed {
            tags,
            author,
            include_drafts,
            limit,
            viewer,
            json,
            quiet,
        } => {
            use hypefeed::cli::feed::{FeedCommand, FeedOptions};

            let cmd = FeedCommand::new(query_service(&config)?);
            let options = FeedOptions {
                json,
                quiet,
                tags,
                author,
                include_drafts,
                limit,
                viewer,
            };
            let output = cmd.run(&options);
            print_output(&cmd.format_output(&output, &options));
            Ok(success_to_exit_code(output.success))
        }
        Commands::Tags {
            sort,
            limit,
            json,
            quiet,
        } => {
            use hypefeed::cli::tags::{TagsCommand, TagsOptions};

            let cmd = TagsCommand::new(query_service(&config)?, config.feed.default_sort());
            let options = TagsOptions {
                json,
                quiet,
                sort,
                limit,
            };
            let output = cmd.run(&options);
            print_output(&cmd.format_output(&output, &options));
            Ok(success_to_exit_code(output.success))
        }
    }
}

// =============================================================================
// Wiring
// =============================================================================

fn data_dir(config: &Config) -> Result<PathBuf, Box<dyn std::error::Error>> {
    config
        .data_dir()
        .ok_or_else(|| "could not determine the data directory".into())
}

type FilePostService = PostService<FilePostStore, FileTagStatsStore, FileHypeStore>;
type FileQueryService = FeedQueryService<FileTagStatsStore, FilePostStore, FileHypeStore>;

fn post_service(config: &Config) -> Result<FilePostService, Box<dyn std::error::Error>> {
    let dir = data_dir(config)?;
    let updater = FeedStatsUpdater::with_calculator(
        FileTagStatsStore::open(&dir)?,
        RankCalculator::from_config(&config.ranking),
    );
    Ok(PostService::new(
        FilePostStore::open(&dir)?,
        updater,
        FileHypeStore::open(&dir)?,
        config.feed.clone(),
    ))
}

fn query_service(config: &Config) -> Result<FileQueryService, Box<dyn std::error::Error>> {
    let dir = data_dir(config)?;
    Ok(FeedQueryService::new(
        FileTagStatsStore::open(&dir)?,
        FilePostStore::open(&dir)?,
        FileHypeStore::open(&dir)?,
    ))
}

fn run_init(
    json: bool,
    quiet: bool,
    force: bool,
    cwd: &Path,
    config: &Config,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use hypefeed::cli::init::{InitCommand, InitOptions};

    let cmd = InitCommand::new(cwd, config.data_dir());
    let options = InitOptions { json, quiet, force };

    let output = cmd.run(&options);
    print_output(&cmd.format_output(&output, &options));
    Ok(success_to_exit_code(output.success))
}

fn print_output(formatted: &str) {
    if !formatted.is_empty() {
        println!("{}", formatted.trim_end());
    }
}

fn publish_flag(publish: bool, unpublish: bool) -> Option<bool> {
    match (publish, unpublish) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Convert a success boolean to the appropriate exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

// =============================================================================
// Tests
// =============================================================================
