use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::fs as async_fs;
use tracing::debug;
use uuid::Uuid;

/// Lifecycle state of a registered file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum FileStatus {
    Ready,
    Processing,
    Success,
    Failed(String),
    Skipped,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Ready => write!(f, "Ready"),
            FileStatus::Processing => write!(f, "Processing..."),
            FileStatus::Success => write!(f, "Success"),
            FileStatus::Failed(reason) => write!(f, "Failed - {}", reason),
            FileStatus::Skipped => write!(f, "Skipped"),
        }
    }
}

/// A file registered in the current batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub original_name: String,
    pub size: Option<u64>,
    pub status: FileStatus,
}

/// Proposed rename for one registered file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    pub original_name: String,
    pub target_name: String,
}

/// One element of a batch submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedFile {
    pub name: String,
    pub size: Option<u64>,
}

impl SubmittedFile {
    pub fn new(name: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// The file and plan registries for one batch.
///
/// Every batch operation takes the session explicitly, so two sessions never
/// share state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    batch_id: Uuid,
    entries: Vec<FileEntry>,
    plans: Vec<RenamePlan>,
    /// Plans consumed by the last fully successful apply, kept for undo
    #[serde(default)]
    last_applied: Vec<RenamePlan>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            entries: Vec::new(),
            plans: Vec::new(),
            last_applied: Vec::new(),
        }
    }

    /// Replace the current batch wholesale.
    ///
    /// Plans and the undo history of the previous batch are dropped with it.
    /// A name submitted twice is registered once.
    pub fn register_batch(&mut self, files: Vec<SubmittedFile>) {
        self.batch_id = Uuid::new_v4();
        self.entries.clear();
        self.plans.clear();
        self.last_applied.clear();

        for file in files {
            if self.entry(&file.name).is_some() {
                debug!("Ignoring duplicate submission: {}", file.name);
                continue;
            }
            self.entries.push(FileEntry {
                original_name: file.name,
                size: file.size,
                status: FileStatus::Ready,
            });
        }

        debug!(
            "Registered batch {} with {} file(s)",
            self.batch_id,
            self.entries.len()
        );
    }

    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn plans(&self) -> &[RenamePlan] {
        &self.plans
    }

    pub fn last_applied(&self) -> &[RenamePlan] {
        &self.last_applied
    }

    pub fn entry(&self, original_name: &str) -> Option<&FileEntry> {
        self.entries
            .iter()
            .find(|entry| entry.original_name == original_name)
    }

    pub fn plan_for(&self, original_name: &str) -> Option<&RenamePlan> {
        self.plans
            .iter()
            .find(|plan| plan.original_name == original_name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.plans.is_empty() && self.last_applied.is_empty()
    }

    /// Record a plan, replacing any existing plan for the same file
    pub(crate) fn upsert_plan(&mut self, plan: RenamePlan) {
        match self
            .plans
            .iter_mut()
            .find(|existing| existing.original_name == plan.original_name)
        {
            Some(existing) => existing.target_name = plan.target_name,
            None => self.plans.push(plan),
        }
    }

    pub(crate) fn set_status(&mut self, original_name: &str, status: FileStatus) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.original_name == original_name)
        {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    /// Register an entry that is no longer part of the batch
    pub(crate) fn restore_entry(&mut self, original_name: &str, status: FileStatus) {
        if !self.set_status(original_name, status.clone()) {
            self.entries.push(FileEntry {
                original_name: original_name.to_string(),
                size: None,
                status,
            });
        }
    }

    /// Finish a batch after every plan was applied
    pub(crate) fn complete_batch(&mut self) {
        self.last_applied = std::mem::take(&mut self.plans);
        self.entries.clear();
    }

    /// Drop plans and undo history after a clean undo
    pub(crate) fn clear_plans(&mut self) {
        self.plans.clear();
        self.last_applied.clear();
    }
}

/// Persists the session between command invocations
pub struct SessionStore {
    pub state_dir: PathBuf,
    pub session_file: PathBuf,
}

impl SessionStore {
    pub fn new(work_root: PathBuf) -> Self {
        let state_dir = work_root.join(".episode-renamer");
        let session_file = state_dir.join("session.json");

        Self {
            state_dir,
            session_file,
        }
    }

    /// Load the saved session, or an empty one if nothing was saved
    pub async fn load(&self) -> Result<Session> {
        if !self.session_file.exists() {
            debug!("No saved session at {:?}", self.session_file);
            return Ok(Session::new());
        }

        let content = async_fs::read_to_string(&self.session_file)
            .await
            .with_context(|| format!("Failed to read session file {:?}", self.session_file))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt session file {:?}", self.session_file))?;
        Ok(session)
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        async_fs::create_dir_all(&self.state_dir).await?;
        let content = serde_json::to_string_pretty(session)?;
        async_fs::write(&self.session_file, content)
            .await
            .with_context(|| format!("Failed to write session file {:?}", self.session_file))?;
        debug!("Saved session {} to {:?}", session.batch_id, self.session_file);
        Ok(())
    }

    pub async fn clean(&self) -> Result<()> {
        if self.state_dir.exists() {
            async_fs::remove_dir_all(&self.state_dir).await?;
        }
        Ok(())
    }
}
