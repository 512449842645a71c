use std::path::PathBuf;
use thiserror::Error;

/// Per-file failure kinds raised while planning, applying or undoing a batch.
///
/// None of these abort a batch. They end up as a `Failed` status or in the
/// counts of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("No episode pattern matched '{0}'")]
    UnclassifiableFilename(String),

    #[error("Season {found} does not match season under review {expected}")]
    SeasonMismatch { expected: u32, found: u32 },

    #[error("Episode {episode} not found in season {season}")]
    EpisodeNotFound { season: u32, episode: u32 },

    #[error("File not found: {0}")]
    SourceNotFound(String),

    #[error("Destination exists: {0}")]
    DestinationExists(String),

    #[error("Original name already taken: {0}")]
    NameCollision(String),

    #[error("{0}")]
    Filesystem(String),
}

impl From<std::io::Error> for RenameError {
    fn from(err: std::io::Error) -> Self {
        RenameError::Filesystem(err.to_string())
    }
}

/// Conditions that refuse an operation outright.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TMDB_API_KEY is not set; a catalog credential is required")]
    MissingApiKey,

    #[error("TMDB rejected the API key (HTTP 401); check TMDB_API_KEY")]
    InvalidApiKey,

    #[error("Root directory does not exist: {0:?}")]
    RootNotFound(PathBuf),

    #[error("Root path is not a directory: {0:?}")]
    RootNotDirectory(PathBuf),

    #[error("Root directory is not readable: {0:?}: {1}")]
    RootUnreadable(PathBuf, String),
}
