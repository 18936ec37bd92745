// src/lib.rs
pub mod dialect;
pub mod prompt;
pub mod server;
pub mod settings;
pub mod validate;

#[cfg(not(target_arch = "wasm32"))]
pub mod editor;
#[cfg(not(target_arch = "wasm32"))]
pub mod generator;
#[cfg(not(target_arch = "wasm32"))]
pub mod poll;
#[cfg(not(target_arch = "wasm32"))]
pub mod scaffold;
#[cfg(not(target_arch = "wasm32"))]
pub mod workspace;

use zed_extension_api as zed;
use zed::settings::LspSettings;
use zed::{Command, LanguageServerId, Result, Worktree};

use crate::server::{ServerLookup, SERVER_BINARY, SERVER_JAR_ENV};
use crate::settings::{CamelSettings, LANGUAGE_SERVER_ID};

struct CamelExtension;

impl zed::Extension for CamelExtension {
    fn new() -> Self {
        CamelExtension
    }

    fn language_server_command(
        &mut self,
        language_server_id: &LanguageServerId,
        worktree: &Worktree,
    ) -> Result<Command> {
        if language_server_id.as_ref() != LANGUAGE_SERVER_ID {
            return Err("unknown language server".into());
        }

        let binary = LspSettings::for_worktree(LANGUAGE_SERVER_ID, worktree)
            .ok()
            .and_then(|settings| settings.binary);
        let env = worktree.shell_env();
        let launch = ServerLookup {
            configured_path: binary.as_ref().and_then(|b| b.path.clone()),
            configured_args: binary.and_then(|b| b.arguments),
            on_path: worktree.which(SERVER_BINARY),
            java: worktree.which("java"),
            jar: env
                .iter()
                .find(|(key, _)| key == SERVER_JAR_ENV)
                .map(|(_, value)| value.clone()),
        }
        .resolve()?;

        Ok(Command {
            command: launch.command,
            args: launch.args,
            env,
        })
    }

    fn language_server_workspace_configuration(
        &mut self,
        language_server_id: &LanguageServerId,
        worktree: &Worktree,
    ) -> Result<Option<zed::serde_json::Value>> {
        if language_server_id.as_ref() != LANGUAGE_SERVER_ID {
            return Ok(None);
        }
        let camel = LspSettings::for_worktree(LANGUAGE_SERVER_ID, worktree)
            .ok()
            .and_then(|settings| settings.settings)
            .map(|value| CamelSettings::from_settings(&value))
            .unwrap_or_default();
        Ok(Some(camel.workspace_configuration()))
    }
}

zed::register_extension!(CamelExtension);
