//! Remote episode catalog.
//!
//! `TmdbClient` talks to The Movie Database v3 API. Callers go through
//! `CatalogSession`, which memoizes show searches for the life of the session
//! and turns catalog failures into "no data". A rejected credential is the
//! exception: it surfaces as `ConfigError::InvalidApiKey`.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ConfigError;

/// A show returned by a catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl ShowSummary {
    /// "Name (YYYY)", or "Name (N/A)" without a usable air date
    pub fn display_name(&self) -> String {
        let year = self
            .first_air_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .unwrap_or("N/A");
        format!("{} ({})", self.name, year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowDetails {
    pub name: String,
    pub number_of_seasons: u32,
}

/// One episode of a season, as known to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub number: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeasonDetails {
    pub episodes: Vec<Episode>,
}

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search_shows(&self, query: &str) -> Result<Vec<ShowSummary>>;

    async fn show_details(&self, show_id: u64) -> Result<ShowDetails>;

    async fn season_details(&self, show_id: u64, season: u32) -> Result<SeasonDetails>;
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<ShowSummary>,
}

#[derive(Debug, Deserialize)]
struct TmdbShowResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    number_of_seasons: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TmdbSeasonResponse {
    #[serde(default)]
    episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Deserialize)]
struct TmdbEpisode {
    episode_number: u32,
    #[serde(default)]
    name: String,
}

impl From<TmdbSeasonResponse> for SeasonDetails {
    fn from(season: TmdbSeasonResponse) -> Self {
        Self {
            episodes: season
                .episodes
                .into_iter()
                .map(|ep| Episode {
                    number: ep.episode_number,
                    title: ep.name,
                })
                .collect(),
        }
    }
}

/// TMDB API client
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    /// Build a client from configuration. Refuses to start without an API key.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self::new(
            api_key,
            config.base_url.clone(),
            config.language.clone(),
        ))
    }

    pub fn new(api_key: String, base_url: String, language: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            language,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("TMDB request: {}", path);

        // Errors are stripped of their URL; it carries the API key.
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(query)
            .send()
            .await
            .map_err(|e| anyhow!("TMDB request to {} failed: {}", path, e.without_url()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ConfigError::InvalidApiKey.into());
        }
        if !status.is_success() {
            return Err(anyhow!("TMDB returned HTTP {} for {}", status, path));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("Invalid TMDB response for {}: {}", path, e.without_url()))
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn search_shows(&self, query: &str) -> Result<Vec<ShowSummary>> {
        let response: TmdbSearchResponse =
            self.get_json("/search/tv", &[("query", query)]).await?;
        Ok(response.results)
    }

    async fn show_details(&self, show_id: u64) -> Result<ShowDetails> {
        let response: TmdbShowResponse = self.get_json(&format!("/tv/{}", show_id), &[]).await?;
        Ok(ShowDetails {
            name: response.name,
            number_of_seasons: response.number_of_seasons.unwrap_or(0),
        })
    }

    async fn season_details(&self, show_id: u64, season: u32) -> Result<SeasonDetails> {
        let response: TmdbSeasonResponse = self
            .get_json(&format!("/tv/{}/season/{}", show_id, season), &[])
            .await?;
        Ok(response.into())
    }
}

/// Call and cache-hit counters for one catalog session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub api_calls: usize,
    pub cache_hits: usize,
}

/// Session-scoped catalog access
pub struct CatalogSession<C> {
    catalog: C,
    search_cache: HashMap<String, Vec<ShowSummary>>,
    stats: CatalogStats,
}

impl<C: Catalog> CatalogSession<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            search_cache: HashMap::new(),
            stats: CatalogStats::default(),
        }
    }

    /// Search for shows. Identical queries (ignoring case and surrounding
    /// whitespace) are answered from the cache.
    pub async fn search_shows(&mut self, query: &str) -> Result<Vec<ShowSummary>, ConfigError> {
        let key = query.trim().to_lowercase();
        if key.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(cached) = self.search_cache.get(&key) {
            self.stats.cache_hits += 1;
            debug!("Cache hit for show search: {}", key);
            return Ok(cached.clone());
        }

        self.stats.api_calls += 1;
        match self.catalog.search_shows(query.trim()).await {
            Ok(results) => {
                debug!("Show search '{}' returned {} result(s)", key, results.len());
                self.search_cache.insert(key, results.clone());
                Ok(results)
            }
            Err(e) => {
                credential_failure(e, "Error searching for shows")?;
                Ok(Vec::new())
            }
        }
    }

    pub async fn show_details(&mut self, show_id: u64) -> Result<Option<ShowDetails>, ConfigError> {
        self.stats.api_calls += 1;
        match self.catalog.show_details(show_id).await {
            Ok(details) => Ok(Some(details)),
            Err(e) => {
                credential_failure(e, "Could not fetch show details")?;
                Ok(None)
            }
        }
    }

    /// Episodes of one season; empty when the catalog has nothing
    pub async fn season_episodes(
        &mut self,
        show_id: u64,
        season: u32,
    ) -> Result<Vec<Episode>, ConfigError> {
        self.stats.api_calls += 1;
        match self.catalog.season_details(show_id, season).await {
            Ok(details) => {
                if details.episodes.is_empty() {
                    warn!("No episodes found for show {}, season {}", show_id, season);
                }
                Ok(details.episodes)
            }
            Err(e) => {
                credential_failure(e, "Error getting season details")?;
                Ok(Vec::new())
            }
        }
    }

    pub fn stats(&self) -> CatalogStats {
        self.stats
    }
}

/// Pass a configuration error through; log anything else as "no data"
fn credential_failure(err: anyhow::Error, context: &str) -> Result<(), ConfigError> {
    match err.downcast::<ConfigError>() {
        Ok(config_err) => Err(config_err),
        Err(other) => {
            warn!("{}: {}", context, other);
            Ok(())
        }
    }
}
