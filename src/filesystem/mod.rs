//! Filesystem access used by the rename orchestrator.
//!
//! The orchestrator only ever looks one level below the configured root, so
//! the capability is deliberately narrow. `MemoryFileSystem` stands in for
//! real storage in tests.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait FileSystem {
    /// Immediate subdirectories of `root`, sorted by path
    fn subdirectories(&self, root: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whether anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Rename within the same directory. Must not be used to overwrite.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Whether `dir` holds a regular file called exactly `name`
    fn contains_file(&self, dir: &Path, name: &str) -> bool {
        self.exists(&dir.join(name))
    }
}

/// Find the first immediate subdirectory of `root` that contains `name`.
pub fn locate_in_subdirectories<F: FileSystem + ?Sized>(
    fs: &F,
    root: &Path,
    name: &str,
) -> io::Result<Option<PathBuf>> {
    for dir in fs.subdirectories(root)? {
        if fs.contains_file(&dir, name) {
            return Ok(Some(dir));
        }
    }
    Ok(None)
}

/// `std::fs` backed implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn subdirectories(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn contains_file(&self, dir: &Path, name: &str) -> bool {
        dir.join(name).is_file()
    }
}

/// In-memory filesystem double
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    dirs: BTreeSet<PathBuf>,
    files: BTreeSet<PathBuf>,
    rename_failures: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory and all of its ancestors
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            state.dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Register a file, creating its parent directories
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.lock().files.insert(path.to_path_buf());
    }

    pub fn has_file(&self, path: impl AsRef<Path>) -> bool {
        self.lock().files.contains(path.as_ref())
    }

    /// Make every rename whose source is `path` fail with `message`
    pub fn fail_rename_from(&self, path: impl AsRef<Path>, message: &str) {
        self.lock()
            .rename_failures
            .insert(path.as_ref().to_path_buf(), message.to_string());
    }

    /// All files currently known, sorted
    pub fn files(&self) -> Vec<PathBuf> {
        self.lock().files.iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileSystem for MemoryFileSystem {
    fn subdirectories(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        if !state.dirs.contains(root) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No such directory: {}", root.display()),
            ));
        }
        Ok(state
            .dirs
            .iter()
            .filter(|dir| dir.parent() == Some(root))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.files.contains(path) || state.dirs.contains(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if let Some(message) = state.rename_failures.get(from) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, message.clone()));
        }
        if !state.files.remove(from) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No such file: {}", from.display()),
            ));
        }
        state.files.insert(to.to_path_buf());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No such directory: {}", path.display()),
            ));
        }
        state.dirs.retain(|dir| !dir.starts_with(path));
        state.files.retain(|file| !file.starts_with(path));
        Ok(())
    }

    fn contains_file(&self, dir: &Path, name: &str) -> bool {
        self.lock().files.contains(&dir.join(name))
    }
}
