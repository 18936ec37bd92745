// src/workspace.rs
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Files currently known to the workspace.
#[allow(async_fn_in_trait)]
pub trait Workspace {
    /// Known files named exactly `file_name` directly under the workspace
    /// root. Files of the same name in subdirectories never match.
    async fn find_files(&self, file_name: &str) -> io::Result<Vec<PathBuf>>;
}

/// Looks at the disk on every query.
#[derive(Debug, Clone)]
pub struct ScanWorkspace {
    root: PathBuf,
}

impl ScanWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Workspace for ScanWorkspace {
    async fn find_files(&self, file_name: &str) -> io::Result<Vec<PathBuf>> {
        let root = self.root.clone();
        let file_name = file_name.to_string();
        tokio::task::spawn_blocking(move || find_at_root(&root, &file_name))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}

fn root_pattern(root: &Path) -> io::Result<String> {
    let root_str = root.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("workspace path is not valid UTF-8: {}", root.display()),
        )
    })?;
    Ok(glob::Pattern::escape(root_str))
}

fn glob_files(pattern: &str) -> io::Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::debug!("skipping unreadable path: {e}"),
        }
    }
    Ok(files)
}

/// Files named `file_name` directly under `root`.
fn find_at_root(root: &Path, file_name: &str) -> io::Result<Vec<PathBuf>> {
    let pattern = format!("{}/{}", root_pattern(root)?, glob::Pattern::escape(file_name));
    glob_files(&pattern)
}

/// Every file under `root`, recursively.
fn scan(root: &Path) -> io::Result<Vec<PathBuf>> {
    glob_files(&format!("{}/**/*", root_pattern(root)?))
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("failed to watch workspace: {0}")]
    Notify(#[from] notify::Error),
    #[error("failed to index workspace: {0}")]
    Scan(#[from] io::Error),
}

/// Keeps an index of workspace files, seeded by a scan and kept current by
/// filesystem events. Queries never touch the disk.
pub struct WatchedWorkspace {
    root: PathBuf,
    index: Arc<Mutex<BTreeSet<PathBuf>>>,
    _watcher: RecommendedWatcher,
}

impl WatchedWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, WatchError> {
        let root = root.into();
        let index = Arc::new(Mutex::new(BTreeSet::new()));

        let events = index.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => apply_event(&mut lock(&events), &event),
            Err(e) => log::warn!("workspace watch error: {e}"),
        })?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        // Seed after the watch is live so files created in between are not lost.
        let seeded = scan(&root)?;
        log::debug!("indexed {} files under {}", seeded.len(), root.display());
        lock(&index).extend(seeded);

        Ok(Self {
            root,
            index,
            _watcher: watcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Workspace for WatchedWorkspace {
    async fn find_files(&self, file_name: &str) -> io::Result<Vec<PathBuf>> {
        Ok(lock(&self.index)
            .iter()
            .filter(|p| p.parent() == Some(self.root.as_path()))
            .filter(|p| p.file_name().is_some_and(|n| n == file_name))
            .cloned()
            .collect())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_event(index: &mut BTreeSet<PathBuf>, event: &Event) {
    match event.kind {
        EventKind::Create(_) => {
            for path in &event.paths {
                track(index, path);
            }
        }
        EventKind::Remove(_) => {
            for path in &event.paths {
                forget(index, path);
            }
        }
        // Renames report both ends; each path is resolved against the disk.
        EventKind::Modify(ModifyKind::Name(_)) => {
            for path in &event.paths {
                if path.exists() {
                    track(index, path);
                } else {
                    forget(index, path);
                }
            }
        }
        _ => {}
    }
}

fn track(index: &mut BTreeSet<PathBuf>, path: &Path) {
    if path.is_file() {
        index.insert(path.to_path_buf());
    } else if path.is_dir() {
        match scan(path) {
            Ok(files) => index.extend(files),
            Err(e) => log::warn!("failed to index {}: {e}", path.display()),
        }
    }
}

fn forget(index: &mut BTreeSet<PathBuf>, path: &Path) {
    index.retain(|known| !known.starts_with(path));
}

/// The workspace used by the command line: watched when the platform
/// allows it, scanned otherwise.
pub enum ProjectWorkspace {
    Watched(WatchedWorkspace),
    Scanned(ScanWorkspace),
}

impl ProjectWorkspace {
    pub fn open(root: &Path) -> Self {
        match WatchedWorkspace::new(root) {
            Ok(watched) => ProjectWorkspace::Watched(watched),
            Err(e) => {
                log::warn!("{e}; falling back to scanning {}", root.display());
                ProjectWorkspace::Scanned(ScanWorkspace::new(root))
            }
        }
    }
}

impl Workspace for ProjectWorkspace {
    async fn find_files(&self, file_name: &str) -> io::Result<Vec<PathBuf>> {
        match self {
            ProjectWorkspace::Watched(w) => w.find_files(file_name).await,
            ProjectWorkspace::Scanned(w) => w.find_files(file_name).await,
        }
    }
}
