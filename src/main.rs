use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use directory_copy_step::{
    DirectoryCopyStep, EguiDialogRunner, Settings, WorkflowHost, WorkflowStep,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

/// File inside the workflow directory holding the step's saved state.
const STATE_FILE: &str = "directory_copy_step.json";

#[derive(Parser)]
#[command(
    name = "directory-copy-step",
    version,
    about = "Configure and run a directory copy workflow step"
)]
struct Cli {
    /// Workflow directory; defaults to the one used last.
    #[arg(long, global = true)]
    workflow: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the configuration dialog and save the result.
    Configure,
    /// Copy `source` into the configured destination.
    Run { source: PathBuf },
    /// Print the saved step configuration.
    Show,
    /// Move the step to another workflow directory, keeping its destination.
    Relocate { to: PathBuf },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn save_state(path: &Path, step: &DirectoryCopyStep) -> Result<()> {
    let data = step.serialize()?;
    fs::write(path, data).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut settings = Settings::load();
    let workflow = match cli.workflow.or_else(|| settings.workflow_location.clone()) {
        Some(workflow) => workflow,
        None => std::env::current_dir().context("resolving the current directory")?,
    };
    settings.workflow_location = Some(workflow.clone());
    settings.save();

    let host = WorkflowHost::new();
    let mut step = DirectoryCopyStep::new(&workflow, host.clone());
    let state_path = workflow.join(STATE_FILE);
    if state_path.is_file() {
        let data = fs::read_to_string(&state_path)
            .with_context(|| format!("reading {}", state_path.display()))?;
        step.deserialize(&data)?;
    }
    host.register(step.identifier());

    match cli.command {
        Command::Configure => {
            let previous = step.identifier().to_owned();
            step.configure(&mut EguiDialogRunner)?;
            host.rename(&previous, step.identifier());
            save_state(&state_path, &step)?;
        }
        Command::Run { source } => {
            if !step.is_configured() {
                bail!("step in {} is not configured", workflow.display());
            }
            step.set_port_data(0, source)?;
            step.execute()?;
        }
        Command::Show => println!("{}", step.serialize()?),
        Command::Relocate { to } => {
            fs::create_dir_all(&to).with_context(|| format!("creating {}", to.display()))?;
            step.relocate_configuration(&to);
            save_state(&to.join(STATE_FILE), &step)?;
            settings.workflow_location = Some(to);
            settings.save();
        }
    }
    Ok(())
}
