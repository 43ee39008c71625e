use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "genesis")]
#[command(version, about = "Bootstrap automation driver for the Genesis Core workspace")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    /// Reconstruction target directory (overrides genesis.toml)
    #[arg(long, global = true)]
    pub base_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute the full reconstruction plan
    Run,
    /// List the phases of the reconstruction plan
    Plan,
    /// Inspect the target workspace without running anything
    Status,
    /// Inspect stored execution reports
    Reports {
        #[command(subcommand)]
        command: ReportsCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum ReportsCommands {
    /// List stored reports, most recent first
    List,
    /// Show one report in full (defaults to the most recent)
    Show {
        /// Path to a specific report artifact
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let invocation_dir = std::env::current_dir().context("Failed to get current directory")?;
    let file_config = genesis::config::GenesisToml::load_or_default(&invocation_dir)?;
    let base_path = genesis::config::resolve_base_path(cli.base_path.as_deref(), &file_config);

    match &cli.command {
        // `run` sets up its own logging (the run log file lives under the
        // target, which must exist first).
        Commands::Run => cmd::cmd_run(base_path, cli.verbose, cli.yes)?,
        Commands::Plan => {
            genesis::logging::init(cli.verbose);
            cmd::cmd_plan()?;
        }
        Commands::Status => {
            genesis::logging::init(cli.verbose);
            cmd::cmd_status(base_path)?;
        }
        Commands::Reports { command } => {
            genesis::logging::init(cli.verbose);
            cmd::cmd_reports(base_path, command)?;
        }
    }

    Ok(())
}
