use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use super::print_status_table;
use crate::config::Config;
use crate::filesystem::RealFileSystem;
use crate::orchestrator::RenameOrchestrator;
use crate::session::{Session, SessionStore};

/// Command to show the file table, reconciled with the disk
pub struct StatusCommand {
    config: Config,
    work_root: PathBuf,
}

impl StatusCommand {
    pub fn new(config: Config, work_root: PathBuf) -> Self {
        Self { config, work_root }
    }

    pub async fn execute(&self) -> Result<Session> {
        let root = self.config.validate_root()?.to_path_buf();
        let store = SessionStore::new(self.work_root.clone());
        let mut session = store.load().await?;

        let orchestrator = RenameOrchestrator::new(RealFileSystem, root);
        let changed = orchestrator.refresh_statuses(&mut session);
        if changed > 0 {
            info!("Marked {} already renamed file(s) as done", changed);
            store.save(&session).await?;
        }

        print_status_table(&session);
        Ok(session)
    }
}
