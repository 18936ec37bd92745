// src/server.rs
//! How the Camel language server gets started.

pub const SERVER_BINARY: &str = "camel-lsp-server";
pub const SERVER_JAR_ENV: &str = "CAMEL_LSP_JAR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLaunch {
    pub command: String,
    pub args: Vec<String>,
}

/// What the host could find for starting the server.
#[derive(Debug, Clone, Default)]
pub struct ServerLookup {
    /// `lsp.camel-lsp-server.binary.path` from the user's settings.
    pub configured_path: Option<String>,
    pub configured_args: Option<Vec<String>>,
    /// `camel-lsp-server` on the worktree `PATH`.
    pub on_path: Option<String>,
    pub java: Option<String>,
    /// Value of `CAMEL_LSP_JAR` in the worktree environment.
    pub jar: Option<String>,
}

impl ServerLookup {
    /// Configured binary first, then a launcher script on `PATH`, then
    /// `java -jar` on an explicitly named jar.
    pub fn resolve(self) -> Result<ServerLaunch, String> {
        if let Some(command) = self.configured_path {
            return Ok(ServerLaunch {
                command,
                args: self.configured_args.unwrap_or_default(),
            });
        }
        if let Some(command) = self.on_path {
            return Ok(ServerLaunch {
                command,
                args: self.configured_args.unwrap_or_default(),
            });
        }
        match (self.java, self.jar) {
            (Some(java), Some(jar)) => Ok(ServerLaunch {
                command: java,
                args: vec!["-jar".to_string(), jar],
            }),
            (None, Some(_)) => Err(format!(
                "{SERVER_JAR_ENV} is set but `java` was not found on PATH"
            )),
            _ => Err(format!(
                "{SERVER_BINARY} not found: put it on PATH, set lsp.{SERVER_BINARY}.binary.path, \
                 or point {SERVER_JAR_ENV} at the language server jar"
            )),
        }
    }
}
