use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use super::scan::{submitted_from_paths, BatchScanner};
use super::{print_plan_summary, print_status_table};
use crate::catalog::{Catalog, CatalogSession, TmdbClient};
use crate::config::Config;
use crate::filesystem::RealFileSystem;
use crate::orchestrator::{PlanSummary, RenameOrchestrator};
use crate::session::{Session, SessionStore};

/// How the show is picked from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowSelector {
    /// First search hit for the query
    Query(String),
    Id(u64),
}

/// Command to register a batch and plan its renames
pub struct PlanCommand {
    config: Config,
    work_root: PathBuf,
    show: ShowSelector,
    season: u32,
    include: Option<String>,
    files: Vec<PathBuf>,
}

impl PlanCommand {
    pub fn new(
        config: Config,
        work_root: PathBuf,
        show: ShowSelector,
        season: u32,
        include: Option<String>,
        files: Vec<PathBuf>,
    ) -> Self {
        Self {
            config,
            work_root,
            show,
            season,
            include,
            files,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let client = TmdbClient::from_config(&self.config)?;
        let (session, summary) = self.plan_with(client).await?;

        print_plan_summary(&summary);
        print_status_table(&session);
        Ok(())
    }

    /// Plan against any catalog and save the resulting session
    pub async fn plan_with<C: Catalog>(&self, catalog: C) -> Result<(Session, PlanSummary)> {
        let root = self.config.validate_root()?.to_path_buf();
        if self.season == 0 {
            return Err(anyhow!("Season numbers start at 1"));
        }

        let mut catalog = CatalogSession::new(catalog);
        let (show_id, mut show_name) = match &self.show {
            ShowSelector::Query(query) => {
                let show = catalog
                    .search_shows(query)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("No show found matching '{}'", query))?;
                info!("📺 Selected show: {} (id {})", show.display_name(), show.id);
                (show.id, show.name)
            }
            ShowSelector::Id(id) => (*id, String::new()),
        };

        match catalog.show_details(show_id).await? {
            Some(details) => {
                if show_name.is_empty() {
                    show_name = details.name;
                }
                if details.number_of_seasons > 0 && self.season > details.number_of_seasons {
                    return Err(anyhow!(
                        "Season {} is out of range; '{}' has {} season(s)",
                        self.season,
                        show_name,
                        details.number_of_seasons
                    ));
                }
            }
            None => warn!("Season count unknown for show {}", show_id),
        }
        if show_name.is_empty() {
            return Err(anyhow!("Could not resolve a name for show {}", show_id));
        }

        let episodes = catalog.season_episodes(show_id, self.season).await?;

        let batch = if self.files.is_empty() {
            BatchScanner::new(root.clone(), self.include.as_deref())?.scan()?
        } else {
            submitted_from_paths(&self.files)
        };
        if batch.is_empty() {
            return Err(anyhow!("No media files to plan under {:?}", root));
        }

        let mut session = Session::new();
        session.register_batch(batch);

        let orchestrator = RenameOrchestrator::new(RealFileSystem, root);
        let summary = orchestrator.plan_batch(&mut session, &show_name, self.season, &episodes);

        let store = SessionStore::new(self.work_root.clone());
        store.save(&session).await?;

        let stats = catalog.stats();
        info!(
            "✅ Plan saved. Catalog usage: {} API call(s), {} cache hit(s)",
            stats.api_calls, stats.cache_hits
        );
        Ok((session, summary))
    }
}
