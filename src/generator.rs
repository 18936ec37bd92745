// src/generator.rs
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;

use crate::editor::CommandEditor;
use crate::scaffold::PendingArtifact;

const CAMEL_APP: &str = "camel@apache/camel";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("`{tool}` was not found on PATH; it is required to create Camel routes")]
    MissingTool {
        tool: String,
        #[source]
        source: which::Error,
    },
    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Starts the external process that writes a new route file.
///
/// Returning `Ok` only means the process was started; whether it produced
/// the file is observed separately.
#[allow(async_fn_in_trait)]
pub trait Generator {
    async fn dispatch(&self, artifact: &PendingArtifact) -> Result<(), DispatchError>;
}

/// Runs `jbang camel@apache/camel init <file>` in the workspace root and,
/// once it succeeds, opens the new file in the editor.
#[derive(Debug, Clone)]
pub struct JBangGenerator {
    tool: String,
    root: PathBuf,
    camel_version: Option<String>,
    editor: Arc<CommandEditor>,
}

impl JBangGenerator {
    pub fn new(root: impl Into<PathBuf>, editor: Arc<CommandEditor>) -> Self {
        Self {
            tool: "jbang".to_string(),
            root: root.into(),
            camel_version: None,
            editor,
        }
    }

    /// Program looked up on `PATH` instead of `jbang`.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Pins the Camel JBang version (`-Dcamel.jbang.version=`).
    pub fn with_camel_version(mut self, version: Option<String>) -> Self {
        self.camel_version = version;
        self
    }

    fn command(&self, program: PathBuf, artifact: &PendingArtifact) -> Command {
        let mut command = Command::new(program);
        if let Some(version) = &self.camel_version {
            command.arg(format!("-Dcamel.jbang.version={version}"));
        }
        command
            .arg(CAMEL_APP)
            .arg("init")
            .arg(&artifact.file_name)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}

impl Generator for JBangGenerator {
    async fn dispatch(&self, artifact: &PendingArtifact) -> Result<(), DispatchError> {
        let program = which::which(&self.tool).map_err(|source| DispatchError::MissingTool {
            tool: self.tool.clone(),
            source,
        })?;
        let child = self
            .command(program, artifact)
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                command: format!("{} {CAMEL_APP} init", self.tool),
                source,
            })?;
        log::info!(
            "started `{} {CAMEL_APP} init {}` for {}",
            self.tool,
            artifact.file_name,
            artifact.dialect.command_id()
        );

        let editor = self.editor.clone();
        let path = artifact.path.clone();
        tokio::spawn(async move {
            match child.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    if let Err(e) = editor.open(&path).await {
                        log::warn!("failed to open {}: {e}", path.display());
                    }
                }
                Ok(output) => log::warn!(
                    "camel init exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                Err(e) => log::warn!("failed waiting for camel init: {e}"),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::editor::Editor;
    use crate::poll::Poller;
    use std::ffi::OsStr;
    use std::path::Path;
    use std::time::Duration;

    fn editor() -> Arc<CommandEditor> {
        Arc::new(CommandEditor::locate("true").unwrap())
    }

    #[test]
    fn builds_camel_init_command() {
        let root = Path::new("/work");
        let artifact = PendingArtifact::new(root, Dialect::Yaml, "test route");
        let generator = JBangGenerator::new(root, editor())
            .with_camel_version(Some("4.8.0".to_string()));

        let command = generator.command(PathBuf::from("/usr/bin/jbang"), &artifact);
        let cmd = command.as_std();
        assert_eq!(cmd.get_program(), OsStr::new("/usr/bin/jbang"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(
            args,
            [
                "-Dcamel.jbang.version=4.8.0",
                "camel@apache/camel",
                "init",
                "test route.camel.yaml"
            ]
        );
        assert_eq!(cmd.get_current_dir(), Some(root));
    }

    #[tokio::test]
    async fn missing_tool_is_a_dispatch_error() {
        let root = Path::new("/work");
        let artifact = PendingArtifact::new(root, Dialect::Java, "TestRoute");
        let generator = JBangGenerator::new(root, editor()).with_tool("no-such-jbang-7731");
        let err = generator.dispatch(&artifact).await.unwrap_err();
        assert!(matches!(err, DispatchError::MissingTool { ref tool, .. } if tool == "no-such-jbang-7731"));
    }

    #[tokio::test]
    async fn successful_generation_opens_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = PendingArtifact::new(dir.path(), Dialect::Xml, "test-route");
        let editor = editor();
        // `true` accepts any arguments and exits 0, standing in for jbang.
        let generator = JBangGenerator::new(dir.path(), editor.clone()).with_tool("true");

        generator.dispatch(&artifact).await.unwrap();
        Poller::new(Duration::from_millis(10), Duration::from_secs(10))
            .until_sync(|| editor.active_document().as_deref() == Some(artifact.path.as_path()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_generation_opens_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = PendingArtifact::new(dir.path(), Dialect::Xml, "test-route");
        let editor = editor();
        let generator = JBangGenerator::new(dir.path(), editor.clone()).with_tool("false");

        generator.dispatch(&artifact).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(editor.active_document(), None);
    }
}
