use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use super::print_batch_summary;
use crate::config::Config;
use crate::filesystem::RealFileSystem;
use crate::orchestrator::{BatchSummary, RenameOrchestrator};
use crate::session::SessionStore;

/// Command to put renamed files back under their original names
pub struct UndoCommand {
    config: Config,
    work_root: PathBuf,
}

impl UndoCommand {
    pub fn new(config: Config, work_root: PathBuf) -> Self {
        Self { config, work_root }
    }

    pub async fn execute(&self) -> Result<BatchSummary> {
        let root = self.config.validate_root()?.to_path_buf();
        let store = SessionStore::new(self.work_root.clone());
        let mut session = store.load().await?;

        info!("↩️ Undoing batch {}", session.batch_id());
        let orchestrator = RenameOrchestrator::new(RealFileSystem, root);
        let summary = orchestrator.undo_all(&mut session);

        store.save(&session).await?;
        print_batch_summary("Restored", &summary);
        Ok(summary)
    }
}
