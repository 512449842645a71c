use anyhow::Result;
use tracing::info;

use crate::catalog::{Catalog, CatalogSession, ShowSummary, TmdbClient};
use crate::config::Config;

/// Command to look up shows in the catalog
pub struct SearchCommand {
    config: Config,
    query: String,
}

/// A search hit with its season count, when the catalog knows it
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub show: ShowSummary,
    pub number_of_seasons: Option<u32>,
}

impl SearchCommand {
    pub fn new(config: Config, query: String) -> Self {
        Self { config, query }
    }

    pub async fn execute(&self) -> Result<()> {
        let client = TmdbClient::from_config(&self.config)?;
        let results = self.search_with(client).await?;
        print_results(&self.query, &results);
        Ok(())
    }

    pub async fn search_with<C: Catalog>(&self, catalog: C) -> Result<Vec<SearchResult>> {
        info!("🔎 Searching catalog for '{}'", self.query);

        let mut session = CatalogSession::new(catalog);
        let shows = session.search_shows(&self.query).await?;

        let mut results = Vec::with_capacity(shows.len());
        for show in shows {
            let number_of_seasons = session
                .show_details(show.id)
                .await?
                .map(|details| details.number_of_seasons);
            results.push(SearchResult {
                show,
                number_of_seasons,
            });
        }

        let stats = session.stats();
        info!(
            "Catalog usage: {} API call(s), {} cache hit(s)",
            stats.api_calls, stats.cache_hits
        );
        Ok(results)
    }
}

fn print_results(query: &str, results: &[SearchResult]) {
    if results.is_empty() {
        println!("\n❓ No shows found for '{}'", query);
        return;
    }

    println!("\n📺 Shows matching '{}'", query);
    for result in results {
        let seasons = result
            .number_of_seasons
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        println!(
            "{:>8}  {}  ({} season(s))",
            result.show.id,
            result.show.display_name(),
            seasons
        );
    }
}
