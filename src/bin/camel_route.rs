// src/bin/camel_route.rs
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use camel_zed::dialect::Dialect;
use camel_zed::editor::CommandEditor;
use camel_zed::generator::JBangGenerator;
use camel_zed::prompt::LinePrompt;
use camel_zed::scaffold::{ScaffoldError, ScaffoldTimeouts, Scaffolder, Stage};
use camel_zed::settings::{JsonSettings, RuntimeProvider, SettingsStore, RUNTIME_PROVIDER_KEY};
use camel_zed::workspace::ProjectWorkspace;

#[derive(Parser, Debug)]
#[command(
    name = "camel_route",
    about = "Create Camel routes with JBang and manage Camel language server settings"
)]
struct Cli {
    /// Workspace root directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a new route file and wait for it to open
    New(NewArgs),
    /// Read or change the Camel catalog runtime provider
    Provider {
        /// Settings file (defaults to <root>/.zed/settings.json)
        #[arg(long)]
        settings: Option<PathBuf>,

        #[command(subcommand)]
        action: ProviderAction,
    },
}

#[derive(Args, Debug)]
struct NewArgs {
    /// Route DSL: yaml, java, xml, or a camel.jbang.routes.* command id
    dialect: Dialect,

    /// Route name without extension; prompts when omitted
    #[arg(long)]
    name: Option<String>,

    /// Seconds to wait for the file to appear
    #[arg(long, default_value = "30")]
    file_timeout: u64,

    /// Seconds to wait for the editor to open the file
    #[arg(long, default_value = "5")]
    editor_timeout: u64,

    /// Milliseconds between checks
    #[arg(long, default_value = "500")]
    poll_interval: u64,

    /// Editor command used to open the new file
    #[arg(long, env = "CAMEL_ROUTE_EDITOR", default_value = "zed")]
    editor: String,

    /// Camel JBang version to run
    #[arg(long, env = "CAMEL_JBANG_VERSION")]
    camel_version: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ProviderAction {
    /// Print the current provider
    Get,
    /// Set the provider (DEFAULT, SPRINGBOOT, QUARKUS, KARAF)
    Set { provider: RuntimeProvider },
    /// Remove the setting so the server default applies
    Clear,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("workspace root {} not found", cli.root.display()))?;

    match cli.command {
        Cmd::New(args) => new_route(root, args).await,
        Cmd::Provider { settings, action } => {
            let mut store = settings
                .map(JsonSettings::new)
                .unwrap_or_else(|| JsonSettings::for_project(&root));
            provider(&mut store, action)
        }
    }
}

async fn new_route(root: PathBuf, args: NewArgs) -> Result<()> {
    let editor = Arc::new(
        CommandEditor::locate(&args.editor)
            .with_context(|| format!("editor `{}` not found on PATH", args.editor))?,
    );
    let generator = JBangGenerator::new(&root, editor.clone()).with_camel_version(args.camel_version);
    let timeouts = ScaffoldTimeouts {
        file_creation: Duration::from_secs(args.file_timeout),
        editor_activation: Duration::from_secs(args.editor_timeout),
        interval: Duration::from_millis(args.poll_interval),
    };
    let scaffolder = Scaffolder::new(&root, ProjectWorkspace::open(&root), editor, generator)
        .with_timeouts(timeouts);

    let completed = match args.name {
        Some(name) => scaffolder.create(args.dialect, &name).await?,
        None => {
            let mut prompt = LinePrompt::new(io::stdin().lock(), io::stderr());
            scaffolder.run(args.dialect, &mut prompt).await?
        }
    };
    eprintln!("✅ Created {}", completed.artifact.file_name);
    println!("{}", completed.path.display());
    Ok(())
}

fn provider(store: &mut JsonSettings, action: ProviderAction) -> Result<()> {
    match action {
        ProviderAction::Get => match store.runtime_provider()? {
            Some(provider) => println!("{provider}"),
            None => println!("(unset)"),
        },
        ProviderAction::Set { provider } => {
            store.set_runtime_provider(provider)?;
            eprintln!("✅ {RUNTIME_PROVIDER_KEY} = {provider} in {}", store.path().display());
        }
        ProviderAction::Clear => {
            store.clear_runtime_provider()?;
            eprintln!("✅ {RUNTIME_PROVIDER_KEY} cleared in {}", store.path().display());
        }
    }
    Ok(())
}

/// Distinct exit status per failure so scripts can tell stages apart.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ScaffoldError>() {
        Some(ScaffoldError::Rejected(_)) => 2,
        Some(ScaffoldError::Dispatch(_)) => 3,
        Some(e) if e.stage() == Some(Stage::FileCreation) => 4,
        Some(e) if e.stage() == Some(Stage::EditorActivation) => 5,
        Some(ScaffoldError::Cancelled) => 130,
        _ => 1,
    }
}
