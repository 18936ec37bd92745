// src/scaffold.rs
//! Create a route file and confirm it landed.
//!
//! One invocation walks AwaitingInput → Validating → Dispatching →
//! AwaitingFile → AwaitingEditor. The generator runs out of our control, so
//! the last two stages poll for its effects, file first: checking the editor
//! earlier could match an editor opened on an older file of the same name.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::dialect::Dialect;
use crate::editor::Editor;
use crate::generator::{DispatchError, Generator};
use crate::poll::{PollTimeout, Poller};
use crate::prompt::Prompt;
use crate::validate::{NameValidator, ValidationError};
use crate::workspace::Workspace;

/// The file a generation run is expected to produce. Derived once, before
/// dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArtifact {
    pub dialect: Dialect,
    pub name: String,
    pub file_name: String,
    pub path: PathBuf,
}

impl PendingArtifact {
    pub fn new(root: &Path, dialect: Dialect, name: &str) -> Self {
        let file_name = dialect.file_name(name);
        Self {
            dialect,
            name: name.to_string(),
            path: root.join(&file_name),
            file_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaffoldTimeouts {
    pub file_creation: Duration,
    pub editor_activation: Duration,
    pub interval: Duration,
}

impl Default for ScaffoldTimeouts {
    fn default() -> Self {
        Self {
            file_creation: Duration::from_secs(30),
            editor_activation: Duration::from_secs(5),
            interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FileCreation,
    EditorActivation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::FileCreation => "file creation",
            Stage::EditorActivation => "editor activation",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("{stage} timed out after {after:?} waiting for `{file_name}`")]
    Timeout {
        stage: Stage,
        file_name: String,
        after: Duration,
    },
    #[error("route creation was cancelled")]
    Cancelled,
}

impl ScaffoldError {
    /// The polling stage that failed, for timeouts.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ScaffoldError::Timeout { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    fn timeout(stage: Stage, artifact: &PendingArtifact, err: PollTimeout) -> Self {
        ScaffoldError::Timeout {
            stage,
            file_name: artifact.file_name.clone(),
            after: err.after,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub artifact: PendingArtifact,
    /// Where the workspace found the file.
    pub path: PathBuf,
}

pub struct Scaffolder<W, E, G> {
    root: PathBuf,
    workspace: W,
    editor: E,
    generator: G,
    timeouts: ScaffoldTimeouts,
    // Invocations run one at a time; a second waits for the first to settle.
    in_flight: Mutex<()>,
}

impl<W, E, G> Scaffolder<W, E, G>
where
    W: Workspace,
    E: Editor,
    G: Generator,
{
    pub fn new(root: impl Into<PathBuf>, workspace: W, editor: E, generator: G) -> Self {
        Self {
            root: root.into(),
            workspace,
            editor,
            generator,
            timeouts: ScaffoldTimeouts::default(),
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_timeouts(mut self, timeouts: ScaffoldTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn validator(&self, dialect: Dialect) -> NameValidator {
        NameValidator::new(dialect, &self.root)
    }

    /// Creates a route named `name` without prompting.
    pub async fn create(&self, dialect: Dialect, name: &str) -> Result<Completed, ScaffoldError> {
        let _turn = self.in_flight.lock().await;
        self.validator(dialect).validate(name)?;
        self.generate(dialect, name).await
    }

    /// Asks for a name until one validates, then creates the route. A failed
    /// dispatch is reported and the user is asked again.
    pub async fn run<P: Prompt>(
        &self,
        dialect: Dialect,
        prompt: &mut P,
    ) -> Result<Completed, ScaffoldError> {
        let _turn = self.in_flight.lock().await;
        let validator = self.validator(dialect);
        let message = format!(
            "Name of the new Camel {dialect} route (without extension):"
        );
        loop {
            let name = prompt
                .ask(&message, &|input| validator.validate(input))
                .ok_or(ScaffoldError::Cancelled)?;
            validator.validate(&name)?;
            match self.generate(dialect, &name).await {
                Err(ScaffoldError::Dispatch(e)) => {
                    let message = format!("{:#}", anyhow::Error::new(e));
                    log::warn!("{message}");
                    prompt.report(&message);
                }
                outcome => return outcome,
            }
        }
    }

    async fn generate(&self, dialect: Dialect, name: &str) -> Result<Completed, ScaffoldError> {
        let artifact = PendingArtifact::new(&self.root, dialect, name);
        log::info!("{}: creating {}", dialect.command_id(), artifact.file_name);
        self.generator.dispatch(&artifact).await?;

        let path = self.await_file(&artifact).await?;
        log::info!("{} created at {}", artifact.file_name, path.display());
        self.await_editor(&artifact).await?;
        log::info!("{} is open", artifact.file_name);

        Ok(Completed { artifact, path })
    }

    async fn await_file(&self, artifact: &PendingArtifact) -> Result<PathBuf, ScaffoldError> {
        let workspace = &self.workspace;
        Poller::new(self.timeouts.interval, self.timeouts.file_creation)
            .poll_for(move || async move {
                match workspace.find_files(&artifact.file_name).await {
                    Ok(mut files) if files.len() == 1 => files.pop(),
                    Ok(files) => {
                        log::debug!(
                            "waiting for '{}' to be created ({} matches)",
                            artifact.file_name,
                            files.len()
                        );
                        None
                    }
                    Err(e) => {
                        log::warn!("workspace query for '{}' failed: {e}", artifact.file_name);
                        None
                    }
                }
            })
            .await
            .map_err(|e| ScaffoldError::timeout(Stage::FileCreation, artifact, e))
    }

    async fn await_editor(&self, artifact: &PendingArtifact) -> Result<(), ScaffoldError> {
        Poller::new(self.timeouts.interval, self.timeouts.editor_activation)
            .until_sync(|| {
                self.editor
                    .active_document()
                    .is_some_and(|doc| doc.ends_with(&artifact.file_name))
            })
            .await
            .map_err(|e| ScaffoldError::timeout(Stage::EditorActivation, artifact, e))
    }
}
