use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Configuration for the catalog client and the filesystem boundary
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub language: String,
    pub base_url: String,
    /// Directory whose immediate subdirectories hold the media files
    pub root_dir: PathBuf,
    /// Temporary upload area removed after a fully successful apply.
    /// Only set from `EPISODE_RENAMER_STAGING`; never guessed.
    pub staging_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("TMDB_API_KEY").ok(),
            language: env::var("TMDB_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            base_url: env::var("TMDB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TMDB_BASE_URL.to_string()),
            root_dir: env::var("EPISODE_RENAMER_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_root_dir()),
            staging_dir: env::var_os("EPISODE_RENAMER_STAGING")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        }
    }

    /// The catalog credential, or `MissingApiKey` when it is absent or blank
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Check that the root directory exists and can be listed
    pub fn validate_root(&self) -> Result<&Path, ConfigError> {
        let root = self.root_dir.as_path();
        if !root.exists() {
            return Err(ConfigError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ConfigError::RootNotDirectory(root.to_path_buf()));
        }
        fs::read_dir(root)
            .map_err(|e| ConfigError::RootUnreadable(root.to_path_buf(), e.to_string()))?;
        Ok(root)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "en".to_string(),
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            root_dir: default_root_dir(),
            staging_dir: None,
        }
    }
}

/// The user's downloads folder
fn default_root_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}
