//! # Episode Renamer - TV Episode Batch Renaming CLI
//!
//! Renames downloaded TV episode files to `Show-S01E02-Title.ext` using
//! episode titles from The Movie Database (TMDB).
//!
//! ## Features
//!
//! - **Filename Extraction**: Recognizes six common release naming patterns
//! - **Catalog Lookup**: Episode titles from TMDB, with memoized show searches
//! - **Safe Renames**: Never overwrites an existing file
//! - **Undo**: Puts a batch back under its original names
//!
//! ## Usage
//!
//! ```bash
//! # Find a show
//! episode-renamer search "breaking bad"
//!
//! # Plan renames for season 1 of the files under the downloads folder
//! episode-renamer plan --show "breaking bad" --season 1
//!
//! # Rename, inspect, and revert
//! episode-renamer apply
//! episode-renamer status
//! episode-renamer undo
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use episode_renamer::commands::{
    apply::ApplyCommand,
    clean::CleanCommand,
    plan::{PlanCommand, ShowSelector},
    search::SearchCommand,
    status::StatusCommand,
    undo::UndoCommand,
};
use episode_renamer::config::Config;

/// Episode Renamer - batch rename TV episodes with titles from TMDB
#[derive(Parser)]
#[command(
    name = "episode-renamer",
    about = "Batch rename TV episode files using titles from TMDB",
    long_about = "Extracts season and episode numbers from downloaded filenames, looks up episode titles on The Movie Database, and renames files to Show-S01E02-Title.ext with undo support.",
    version
)]
struct Cli {
    /// Directory whose subdirectories hold the media files (defaults to the downloads folder)
    #[arg(long, short = 'r', global = true, env = "EPISODE_RENAMER_ROOT")]
    root: Option<PathBuf>,
    /// Path to the work directory holding session state (defaults to current working directory)
    #[arg(long, short = 'w', global = true)]
    work_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Search the catalog for a show
    Search {
        /// Show name to search for
        query: String,
    },
    /// Register a batch of files and plan their new names
    Plan {
        /// Season to plan; files from other seasons are skipped
        #[arg(long, short = 's')]
        season: u32,
        /// Show name to search for; the first hit is used
        #[arg(long, conflicts_with = "show_id", required_unless_present = "show_id")]
        show: Option<String>,
        /// Catalog id of the show
        #[arg(long)]
        show_id: Option<u64>,
        /// Only scan files whose name matches this glob
        #[arg(long, short = 'i')]
        include: Option<String>,
        /// Files to submit instead of scanning the root
        files: Vec<PathBuf>,
    },
    /// Rename every planned file
    Apply,
    /// Restore original file names
    Undo,
    /// Show the current batch and its statuses
    Status,
    /// Remove session state and the upload staging area
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "episode_renamer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(root) = cli.root {
        config.root_dir = root;
    }
    let work_root = match cli.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let result = match cli.command {
        Commands::Search { query } => {
            info!("Starting search command for query: {:?}", query);
            SearchCommand::new(config, query).execute().await
        }
        Commands::Plan {
            season,
            show,
            show_id,
            include,
            files,
        } => {
            let selector = match (show, show_id) {
                (_, Some(id)) => ShowSelector::Id(id),
                (query, None) => ShowSelector::Query(query.unwrap_or_default()),
            };
            info!(
                "Starting plan command for root: {:?}, show: {:?}, season: {}",
                config.root_dir, selector, season
            );
            PlanCommand::new(config, work_root, selector, season, include, files)
                .execute()
                .await
        }
        Commands::Apply => {
            info!("Starting apply command for root: {:?}", config.root_dir);
            ApplyCommand::new(config, work_root)
                .execute()
                .await
                .map(|_| ())
        }
        Commands::Undo => {
            info!("Starting undo command for root: {:?}", config.root_dir);
            UndoCommand::new(config, work_root)
                .execute()
                .await
                .map(|_| ())
        }
        Commands::Status => StatusCommand::new(config, work_root)
            .execute()
            .await
            .map(|_| ()),
        Commands::Clean => {
            info!("Starting clean command for work: {:?}", work_root);
            CleanCommand::new(work_root, config.staging_dir)
                .execute()
                .await
        }
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
