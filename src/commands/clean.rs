use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::session::SessionStore;

/// Command to remove saved session state and the upload staging area
pub struct CleanCommand {
    work_root: PathBuf,
    staging_dir: Option<PathBuf>,
}

impl CleanCommand {
    pub fn new(work_root: PathBuf, staging_dir: Option<PathBuf>) -> Self {
        Self {
            work_root,
            staging_dir,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        info!("🧹 Cleaning up session state...");

        let store = SessionStore::new(self.work_root.clone());
        store.clean().await?;

        if let Some(staging_dir) = &self.staging_dir {
            if staging_dir.exists() {
                tokio::fs::remove_dir_all(staging_dir).await?;
                info!("Removed staging area: {:?}", staging_dir);
            }
        }

        info!("✅ Cleanup complete.");
        Ok(())
    }
}
