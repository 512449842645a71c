//! Planning, applying and undoing batch renames.
//!
//! Per-file state machine:
//!
//! ```text
//! apply: Ready   -> Processing -> Success | Failed(reason)
//! undo:  Success -> Processing -> Ready   | Failed(reason)
//! ```
//!
//! Apply leaves `Success` entries alone and a retry only touches what is
//! left. Undo only moves files that are actually renamed. A failing file
//! never stops the batch; the outcome is reported through the summary
//! counts and the entry status.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::Episode;
use crate::error::RenameError;
use crate::extractor::extract;
use crate::filesystem::{locate_in_subdirectories, FileSystem};
use crate::session::{FileStatus, RenamePlan, Session};

/// Counts reported by a planning pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub matched: usize,
    pub skipped_different_season: usize,
    pub unmatched: usize,
}

/// A file that failed during apply or undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub original_name: String,
    pub error: RenameError,
}

/// Counts reported by an apply or undo pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Plans left untouched by undo because their file was never renamed
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    fn record_failure(&mut self, original_name: &str, error: RenameError) {
        self.failed += 1;
        self.failures.push(FileFailure {
            original_name: original_name.to_string(),
            error,
        });
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// One row of the file table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub original_name: String,
    /// Empty when the file has no plan
    pub target_name: String,
    pub status: FileStatus,
}

/// Drives the rename state machine against a filesystem
pub struct RenameOrchestrator<F: FileSystem> {
    fs: F,
    root: PathBuf,
    staging_dir: Option<PathBuf>,
}

impl<F: FileSystem> RenameOrchestrator<F> {
    pub fn new(fs: F, root: PathBuf) -> Self {
        Self {
            fs,
            root,
            staging_dir: None,
        }
    }

    /// Set the upload staging area removed after a completed batch
    pub fn with_staging_dir(mut self, staging_dir: Option<PathBuf>) -> Self {
        self.staging_dir = staging_dir;
        self
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Match every registered file against the episodes of `season`.
    ///
    /// Files from another season are left alone, including any plan they
    /// already have.
    pub fn plan_batch(
        &self,
        session: &mut Session,
        show_name: &str,
        season: u32,
        episodes: &[Episode],
    ) -> PlanSummary {
        let mut summary = PlanSummary::default();
        let names: Vec<String> = session
            .entries()
            .iter()
            .map(|entry| entry.original_name.clone())
            .collect();

        for name in names {
            match plan_entry(&name, show_name, season, episodes) {
                Ok(plan) => {
                    debug!("Planned '{}' -> '{}'", plan.original_name, plan.target_name);
                    session.upsert_plan(plan);
                    summary.matched += 1;
                }
                Err(RenameError::SeasonMismatch { found, .. }) => {
                    debug!("Skipping '{}' from season {}", name, found);
                    summary.skipped_different_season += 1;
                }
                Err(e) => {
                    debug!("Could not plan '{}': {}", name, e);
                    summary.unmatched += 1;
                }
            }
        }

        info!(
            "Planned batch {}: {} matched, {} skipped (different season), {} unmatched",
            session.batch_id(),
            summary.matched,
            summary.skipped_different_season,
            summary.unmatched
        );
        summary
    }

    /// Rename every planned file to its target name.
    ///
    /// When all plans succeed the batch is complete. The registries are
    /// cleared and the staging area is removed. Otherwise everything is kept
    /// for inspection, retry or undo.
    pub fn apply_all(&self, session: &mut Session) -> BatchSummary {
        let plans = session.plans().to_vec();
        let mut summary = BatchSummary::default();
        if plans.is_empty() {
            info!("No planned renames to apply");
            return summary;
        }

        info!(
            "Applying {} rename(s) for batch {}",
            plans.len(),
            session.batch_id()
        );

        for plan in &plans {
            match session.entry(&plan.original_name).map(|entry| &entry.status) {
                Some(FileStatus::Success) => {
                    debug!("'{}' already renamed", plan.original_name);
                    summary.succeeded += 1;
                    continue;
                }
                None => {
                    debug!("No registered file for plan '{}'", plan.original_name);
                    continue;
                }
                Some(_) => {}
            }

            session.set_status(&plan.original_name, FileStatus::Processing);
            match self.apply_one(plan) {
                Ok(destination) => {
                    info!("Renamed '{}' -> {:?}", plan.original_name, destination);
                    session.set_status(&plan.original_name, FileStatus::Success);
                    summary.succeeded += 1;
                }
                Err(e) => {
                    warn!("Failed to rename '{}': {}", plan.original_name, e);
                    session.set_status(&plan.original_name, FileStatus::Failed(e.to_string()));
                    summary.record_failure(&plan.original_name, e);
                }
            }
        }

        if summary.failed == 0 {
            session.complete_batch();
            self.remove_staging_area();
            info!("Batch complete: {} file(s) renamed", summary.succeeded);
        } else {
            warn!(
                "{} of {} rename(s) failed; batch kept for retry or undo",
                summary.failed,
                summary.total()
            );
        }

        summary
    }

    fn apply_one(&self, plan: &RenamePlan) -> Result<PathBuf, RenameError> {
        let dir = locate_in_subdirectories(&self.fs, &self.root, &plan.original_name)?
            .ok_or_else(|| RenameError::SourceNotFound(plan.original_name.clone()))?;

        let source = dir.join(&plan.original_name);
        let destination = dir.join(&plan.target_name);
        if plan.target_name == plan.original_name {
            return Ok(destination);
        }
        if self.fs.exists(&destination) {
            return Err(RenameError::DestinationExists(plan.target_name.clone()));
        }

        self.fs.rename(&source, &destination)?;
        Ok(destination)
    }

    /// Rename files back to their original names.
    ///
    /// Works on the current plans, or on the plans of the last completed
    /// batch when there are none. Only `Success` entries, entries dropped by
    /// a completed batch, and failed entries whose file is still under its
    /// new name are moved. When every plan is undone the plans are dropped
    /// and the file entries are kept, now `Ready`.
    pub fn undo_all(&self, session: &mut Session) -> BatchSummary {
        let plans = if session.plans().is_empty() {
            session.last_applied().to_vec()
        } else {
            session.plans().to_vec()
        };
        let mut summary = BatchSummary::default();
        if plans.is_empty() {
            info!("Nothing to undo");
            return summary;
        }

        info!("Undoing {} rename(s)", plans.len());

        for plan in &plans {
            if !self.is_undo_candidate(session, plan) {
                debug!("'{}' was never renamed; leaving it", plan.original_name);
                summary.skipped += 1;
                continue;
            }

            session.restore_entry(&plan.original_name, FileStatus::Success);
            session.set_status(&plan.original_name, FileStatus::Processing);
            match self.undo_one(plan) {
                Ok(()) => {
                    info!("Restored '{}' from '{}'", plan.original_name, plan.target_name);
                    session.set_status(&plan.original_name, FileStatus::Ready);
                    summary.succeeded += 1;
                }
                Err(e) => {
                    warn!("Failed to undo '{}': {}", plan.original_name, e);
                    session.set_status(&plan.original_name, FileStatus::Failed(e.to_string()));
                    summary.record_failure(&plan.original_name, e);
                }
            }
        }

        if summary.failed == 0 && summary.skipped == 0 {
            session.clear_plans();
        }

        summary
    }

    fn is_undo_candidate(&self, session: &Session, plan: &RenamePlan) -> bool {
        match session.entry(&plan.original_name).map(|entry| &entry.status) {
            None | Some(FileStatus::Success) => true,
            Some(FileStatus::Failed(_)) | Some(FileStatus::Processing) => {
                plan.target_name != plan.original_name
                    && self.is_on_disk(&plan.target_name)
                    && !self.is_on_disk(&plan.original_name)
            }
            Some(_) => false,
        }
    }

    fn is_on_disk(&self, name: &str) -> bool {
        matches!(
            locate_in_subdirectories(&self.fs, &self.root, name),
            Ok(Some(_))
        )
    }

    fn undo_one(&self, plan: &RenamePlan) -> Result<(), RenameError> {
        let dir = locate_in_subdirectories(&self.fs, &self.root, &plan.target_name)?
            .ok_or_else(|| RenameError::SourceNotFound(plan.target_name.clone()))?;

        if plan.target_name == plan.original_name {
            return Ok(());
        }
        let renamed = dir.join(&plan.target_name);
        let original = dir.join(&plan.original_name);
        if self.fs.exists(&original) {
            return Err(RenameError::NameCollision(plan.original_name.clone()));
        }

        self.fs.rename(&renamed, &original)?;
        Ok(())
    }

    /// Mark planned files whose target name is already on disk as renamed.
    /// Returns how many entries changed.
    pub fn refresh_statuses(&self, session: &mut Session) -> usize {
        let plans = session.plans().to_vec();
        let mut changed = 0;

        for plan in plans {
            let already_success = session
                .entry(&plan.original_name)
                .map_or(true, |entry| entry.status == FileStatus::Success);
            if already_success {
                continue;
            }

            match locate_in_subdirectories(&self.fs, &self.root, &plan.target_name) {
                Ok(Some(_)) => {
                    session.set_status(&plan.original_name, FileStatus::Success);
                    changed += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Could not scan {:?}: {}", self.root, e);
                    break;
                }
            }
        }

        changed
    }

    fn remove_staging_area(&self) {
        let Some(staging_dir) = &self.staging_dir else {
            return;
        };
        if !self.fs.exists(staging_dir) {
            return;
        }
        match self.fs.remove_dir_all(staging_dir) {
            Ok(()) => debug!("Removed staging area {:?}", staging_dir),
            Err(e) => warn!("Could not remove staging area {:?}: {}", staging_dir, e),
        }
    }
}

/// Build the plan for one file, or say why there is none
pub fn plan_entry(
    original_name: &str,
    show_name: &str,
    season: u32,
    episodes: &[Episode],
) -> Result<RenamePlan, RenameError> {
    let info = extract(original_name)
        .ok_or_else(|| RenameError::UnclassifiableFilename(original_name.to_string()))?;

    if info.season != season {
        return Err(RenameError::SeasonMismatch {
            expected: season,
            found: info.season,
        });
    }

    let episode = episodes
        .iter()
        .find(|ep| ep.number == info.episode)
        .ok_or(RenameError::EpisodeNotFound {
            season,
            episode: info.episode,
        })?;

    Ok(RenamePlan {
        original_name: original_name.to_string(),
        target_name: build_target_name(
            show_name,
            season,
            info.episode,
            &episode.title,
            original_name,
        ),
    })
}

/// `{show}-S{season:02}E{episode:02}-{title}{extension}`
pub fn build_target_name(
    show_name: &str,
    season: u32,
    episode: u32,
    episode_title: &str,
    original_name: &str,
) -> String {
    format!(
        "{}-S{:02}E{:02}-{}{}",
        sanitize_filename(show_name),
        season,
        episode,
        sanitize_filename(episode_title),
        original_extension(original_name)
    )
}

/// Extension of `name` including the leading dot, or an empty string
pub fn original_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Replace characters that are not allowed in filenames
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

/// One row per registered file, in registration order
pub fn status_rows(session: &Session) -> Vec<StatusRow> {
    session
        .entries()
        .iter()
        .map(|entry| StatusRow {
            original_name: entry.original_name.clone(),
            target_name: session
                .plan_for(&entry.original_name)
                .map(|plan| plan.target_name.clone())
                .unwrap_or_default(),
            status: entry.status.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFileSystem;
    use crate::session::SubmittedFile;

    const ROOT: &str = "/downloads";
    const SHOW_DIR: &str = "/downloads/my_show";
    const STAGING: &str = "/work/uploads";

    fn episodes() -> Vec<Episode> {
        vec![
            Episode {
                number: 1,
                title: "Pilot".to_string(),
            },
            Episode {
                number: 2,
                title: "The Return".to_string(),
            },
            Episode {
                number: 3,
                title: "Who/What?".to_string(),
            },
        ]
    }

    fn setup(files: &[&str]) -> (RenameOrchestrator<MemoryFileSystem>, Session) {
        let fs = MemoryFileSystem::new();
        fs.add_dir(ROOT);
        fs.add_dir("/downloads/other_show");
        fs.add_file(format!("{}/readme.txt", STAGING));
        for file in files {
            fs.add_file(Path::new(SHOW_DIR).join(file));
        }

        let orchestrator = RenameOrchestrator::new(fs, PathBuf::from(ROOT))
            .with_staging_dir(Some(PathBuf::from(STAGING)));

        let mut session = Session::new();
        session.register_batch(
            files
                .iter()
                .map(|name| SubmittedFile::new(*name, None))
                .collect(),
        );
        (orchestrator, session)
    }

    fn in_show_dir(name: &str) -> PathBuf {
        Path::new(SHOW_DIR).join(name)
    }

    fn status_of(session: &Session, name: &str) -> FileStatus {
        session.entry(name).unwrap().status.clone()
    }

    #[test]
    fn test_plan_batch_counts() {
        let (orchestrator, mut session) = setup(&[
            "My.Show.S01E01.720p.mkv",
            "My.Show.S01E02.mkv",
            "My.Show.S02E01.mkv",
            "random_file.txt",
            "My.Show.S01E09.mkv",
        ]);

        let summary = orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());

        assert_eq!(
            summary,
            PlanSummary {
                matched: 2,
                skipped_different_season: 1,
                unmatched: 2,
            }
        );
        assert_eq!(
            session.plan_for("My.Show.S01E01.720p.mkv").unwrap().target_name,
            "My Show-S01E01-Pilot.mkv"
        );
        assert!(session.plan_for("random_file.txt").is_none());
        assert!(session.plan_for("My.Show.S01E09.mkv").is_none());
    }

    #[test]
    fn test_season_filter_leaves_entry_untouched() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv", "My.Show.S02E02.mkv"]);

        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());
        orchestrator.plan_batch(&mut session, "My Show", 2, &episodes());

        // The season 1 plan survives the season 2 pass.
        assert_eq!(
            session.plan_for("My.Show.S01E01.mkv").unwrap().target_name,
            "My Show-S01E01-Pilot.mkv"
        );
        assert_eq!(
            session.plan_for("My.Show.S02E02.mkv").unwrap().target_name,
            "My Show-S02E02-The Return.mkv"
        );
        assert_eq!(status_of(&session, "My.Show.S02E02.mkv"), FileStatus::Ready);
    }

    #[test]
    fn test_replanning_overwrites_target() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E02.mkv"]);

        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());
        orchestrator.plan_batch(&mut session, "Renamed Show", 1, &episodes());

        assert_eq!(session.plans().len(), 1);
        assert_eq!(
            session.plans()[0].target_name,
            "Renamed Show-S01E02-The Return.mkv"
        );
    }

    #[test]
    fn test_plan_entry_errors() {
        assert_eq!(
            plan_entry("notes.txt", "Show", 1, &episodes()),
            Err(RenameError::UnclassifiableFilename("notes.txt".to_string()))
        );
        assert_eq!(
            plan_entry("Show.S01E07.mkv", "Show", 1, &episodes()),
            Err(RenameError::EpisodeNotFound {
                season: 1,
                episode: 7
            })
        );
    }

    #[test]
    fn test_target_name_sanitized_and_extension_verbatim() {
        let plan = plan_entry("Show.S01E03.MKV", "Show: Reboot", 1, &episodes()).unwrap();
        assert_eq!(plan.target_name, "Show_ Reboot-S01E03-Who_What_.MKV");

        assert_eq!(original_extension("a.b.mp4"), ".mp4");
        assert_eq!(original_extension("no_extension"), "");
    }

    #[test]
    fn test_apply_all_success_completes_batch() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv", "My.Show.S01E02.mkv"]);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());

        let summary = orchestrator.apply_all(&mut session);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        let fs = orchestrator.filesystem();
        assert!(fs.has_file(in_show_dir("My Show-S01E01-Pilot.mkv")));
        assert!(fs.has_file(in_show_dir("My Show-S01E02-The Return.mkv")));
        assert!(!fs.has_file(in_show_dir("My.Show.S01E01.mkv")));

        assert!(session.entries().is_empty());
        assert!(session.plans().is_empty());
        assert_eq!(session.last_applied().len(), 2);
        assert!(!fs.exists(Path::new(STAGING)));
    }

    #[test]
    fn test_apply_never_overwrites_destination() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv"]);
        orchestrator
            .filesystem()
            .add_file(in_show_dir("My Show-S01E01-Pilot.mkv"));
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());

        let summary = orchestrator.apply_all(&mut session);

        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.failures[0].error,
            RenameError::DestinationExists("My Show-S01E01-Pilot.mkv".to_string())
        );
        let fs = orchestrator.filesystem();
        assert!(fs.has_file(in_show_dir("My.Show.S01E01.mkv")));
        assert!(fs.has_file(in_show_dir("My Show-S01E01-Pilot.mkv")));
        assert_eq!(
            status_of(&session, "My.Show.S01E01.mkv"),
            FileStatus::Failed("Destination exists: My Show-S01E01-Pilot.mkv".to_string())
        );
        assert_eq!(session.plans().len(), 1);
        assert!(fs.exists(Path::new(STAGING)));
    }

    #[test]
    fn test_partial_failure_moves_only_successful_files() {
        let (orchestrator, mut session) = setup(&[
            "My.Show.S01E01.mkv",
            "My.Show.S01E02.mkv",
            "My.Show.S01E03.mkv",
        ]);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());
        orchestrator
            .filesystem()
            .fail_rename_from(in_show_dir("My.Show.S01E02.mkv"), "Permission denied");

        let summary = orchestrator.apply_all(&mut session);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);

        let fs = orchestrator.filesystem();
        assert!(fs.has_file(in_show_dir("My Show-S01E01-Pilot.mkv")));
        assert!(fs.has_file(in_show_dir("My.Show.S01E02.mkv")));
        assert!(fs.has_file(in_show_dir("My Show-S01E03-Who_What_.mkv")));

        assert_eq!(status_of(&session, "My.Show.S01E01.mkv"), FileStatus::Success);
        assert_eq!(
            status_of(&session, "My.Show.S01E02.mkv"),
            FileStatus::Failed("Permission denied".to_string())
        );
        assert_eq!(session.plans().len(), 3);
        assert!(session.last_applied().is_empty());
    }

    #[test]
    fn test_apply_missing_source_is_not_found() {
        let (orchestrator, mut session) = setup(&[]);
        session.register_batch(vec![SubmittedFile::new("My.Show.S01E01.mkv", None)]);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());

        let summary = orchestrator.apply_all(&mut session);

        assert_eq!(
            summary.failures[0].error,
            RenameError::SourceNotFound("My.Show.S01E01.mkv".to_string())
        );
    }

    #[test]
    fn test_apply_with_no_plans_is_noop() {
        let (orchestrator, mut session) = setup(&["random_file.txt"]);

        let summary = orchestrator.apply_all(&mut session);

        assert_eq!(summary, BatchSummary::default());
        assert_eq!(session.entries().len(), 1);
        assert!(orchestrator.filesystem().exists(Path::new(STAGING)));
    }

    #[test]
    fn test_undo_after_full_apply_restores_everything() {
        let names = ["My.Show.S01E01.mkv", "My.Show.S01E02.mkv"];
        let (orchestrator, mut session) = setup(&names);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());
        orchestrator.apply_all(&mut session);

        let summary = orchestrator.undo_all(&mut session);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        for name in names {
            assert!(orchestrator.filesystem().has_file(in_show_dir(name)));
            assert_eq!(status_of(&session, name), FileStatus::Ready);
        }
        assert!(session.plans().is_empty());
        assert!(session.last_applied().is_empty());
    }

    #[test]
    fn test_undo_after_partial_apply_only_moves_renamed_files() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv", "My.Show.S01E02.mkv"]);
        orchestrator
            .filesystem()
            .add_file(in_show_dir("My Show-S01E02-The Return.mkv"));
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());
        orchestrator.apply_all(&mut session);

        let summary = orchestrator.undo_all(&mut session);

        // E02 never moved; the file under its target name is not ours.
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(status_of(&session, "My.Show.S01E01.mkv"), FileStatus::Ready);
        assert!(matches!(
            status_of(&session, "My.Show.S01E02.mkv"),
            FileStatus::Failed(_)
        ));
        let fs = orchestrator.filesystem();
        assert!(fs.has_file(in_show_dir("My.Show.S01E01.mkv")));
        assert!(fs.has_file(in_show_dir("My.Show.S01E02.mkv")));
        assert!(fs.has_file(in_show_dir("My Show-S01E02-The Return.mkv")));
        assert_eq!(session.plans().len(), 2);
    }

    #[test]
    fn test_retry_apply_after_partial_failure_completes_batch() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv", "My.Show.S01E02.mkv"]);
        let blocker = in_show_dir("My Show-S01E02-The Return.mkv");
        orchestrator.filesystem().add_file(&blocker);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());

        let first = orchestrator.apply_all(&mut session);
        assert_eq!((first.succeeded, first.failed), (1, 1));

        orchestrator
            .filesystem()
            .rename(&blocker, Path::new("/elsewhere/blocker.mkv"))
            .unwrap();
        let retry = orchestrator.apply_all(&mut session);

        assert_eq!(retry.succeeded, 2);
        assert_eq!(retry.failed, 0);
        assert_eq!(retry.total(), 2);
        let fs = orchestrator.filesystem();
        assert!(fs.has_file(in_show_dir("My Show-S01E01-Pilot.mkv")));
        assert!(fs.has_file(in_show_dir("My Show-S01E02-The Return.mkv")));
        assert!(session.entries().is_empty());
        assert_eq!(session.last_applied().len(), 2);
    }

    #[test]
    fn test_undo_before_apply_changes_nothing() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv"]);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());

        let summary = orchestrator.undo_all(&mut session);

        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(status_of(&session, "My.Show.S01E01.mkv"), FileStatus::Ready);
        assert_eq!(session.plans().len(), 1);
        assert!(orchestrator
            .filesystem()
            .has_file(in_show_dir("My.Show.S01E01.mkv")));
    }

    #[test]
    fn test_retry_undo_after_collision_is_resolved() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv"]);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());
        orchestrator.apply_all(&mut session);
        let squatter = in_show_dir("My.Show.S01E01.mkv");
        orchestrator.filesystem().add_file(&squatter);

        let first = orchestrator.undo_all(&mut session);
        assert_eq!(
            first.failures[0].error,
            RenameError::NameCollision("My.Show.S01E01.mkv".to_string())
        );

        orchestrator
            .filesystem()
            .rename(&squatter, Path::new("/elsewhere/squatter.mkv"))
            .unwrap();
        let retry = orchestrator.undo_all(&mut session);

        assert_eq!(retry.succeeded, 1);
        assert_eq!(retry.failed, 0);
        assert_eq!(status_of(&session, "My.Show.S01E01.mkv"), FileStatus::Ready);
        assert!(session.last_applied().is_empty());
    }

    #[test]
    fn test_undo_missing_renamed_file() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv"]);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());
        orchestrator.apply_all(&mut session);
        orchestrator.filesystem().rename(
            &in_show_dir("My Show-S01E01-Pilot.mkv"),
            Path::new("/elsewhere/moved.mkv"),
        )
        .unwrap();

        let summary = orchestrator.undo_all(&mut session);

        assert_eq!(
            summary.failures[0].error,
            RenameError::SourceNotFound("My Show-S01E01-Pilot.mkv".to_string())
        );
        assert!(matches!(
            status_of(&session, "My.Show.S01E01.mkv"),
            FileStatus::Failed(_)
        ));
        assert_eq!(session.last_applied().len(), 1);
    }

    #[test]
    fn test_refresh_statuses_detects_renamed_files() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv", "My.Show.S01E02.mkv"]);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());
        orchestrator
            .filesystem()
            .rename(
                &in_show_dir("My.Show.S01E01.mkv"),
                &in_show_dir("My Show-S01E01-Pilot.mkv"),
            )
            .unwrap();

        assert_eq!(orchestrator.refresh_statuses(&mut session), 1);
        assert_eq!(status_of(&session, "My.Show.S01E01.mkv"), FileStatus::Success);
        assert_eq!(status_of(&session, "My.Show.S01E02.mkv"), FileStatus::Ready);
    }

    #[test]
    fn test_status_rows() {
        let (orchestrator, mut session) = setup(&["My.Show.S01E01.mkv", "random_file.txt"]);
        orchestrator.plan_batch(&mut session, "My Show", 1, &episodes());

        let rows = status_rows(&session);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].target_name, "My Show-S01E01-Pilot.mkv");
        assert_eq!(rows[1].target_name, "");
        assert_eq!(rows[1].status, FileStatus::Ready);
    }
}
