// src/editor.rs
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::process::Command;

/// The editor whose focused document we observe.
pub trait Editor {
    /// Path of the document in the focused editor, if any.
    fn active_document(&self) -> Option<PathBuf>;
}

impl<E: Editor + ?Sized> Editor for Arc<E> {
    fn active_document(&self) -> Option<PathBuf> {
        (**self).active_document()
    }
}

/// Opens files through an editor's command line (`zed <file>`). The active
/// document is the last file the editor accepted.
#[derive(Debug)]
pub struct CommandEditor {
    program: PathBuf,
    active: Mutex<Option<PathBuf>>,
}

impl CommandEditor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            active: Mutex::new(None),
        }
    }

    /// Finds `name` on `PATH`.
    pub fn locate(name: &str) -> Result<Self, which::Error> {
        let program = which::which(name)?;
        log::debug!("using editor at {}", program.display());
        Ok(Self::new(program))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub async fn open(&self, path: &Path) -> io::Result<()> {
        let status = Command::new(&self.program).arg(path).status().await?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("`{} {}` exited with {status}", self.program.display(), path.display()),
            ));
        }
        log::info!("opened {}", path.display());
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.to_path_buf());
        Ok(())
    }
}

impl Editor for CommandEditor {
    fn active_document(&self) -> Option<PathBuf> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
