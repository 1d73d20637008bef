use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::scale::ScaleArgs;

#[derive(Parser)]
#[command(
    name = "rescale",
    about = "rescale: replica scaling for compose projects",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Project and backend selection shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Compose configuration files
    #[arg(short = 'f', long = "file", global = true)]
    pub files: Vec<PathBuf>,
    /// Compose project name
    #[arg(short = 'p', long, global = true)]
    pub project_name: Option<String>,
    /// Alternate working directory for the compose project
    #[arg(long, global = true)]
    pub project_directory: Option<PathBuf>,
    /// Path to rescale.toml (default: <project-directory>/rescale.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Docker command, e.g. "docker" or "sudo -n docker"
    #[arg(long, global = true)]
    pub docker: Option<String>,
    /// Timeout for a discovery or sampling docker call, in seconds (default: 10)
    #[arg(long, global = true)]
    pub command_timeout: Option<u64>,
    /// Timeout for a `compose up --scale` call, in seconds (default: 120)
    #[arg(long, global = true)]
    pub scale_timeout: Option<u64>,
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Scale services to a fixed replica count, or autoscale them.
    ///
    /// Manual mode takes SERVICE=REPLICAS arguments. With --auto the
    /// arguments are service names to autoscale (default: all services),
    /// and the command runs until interrupted with Ctrl-C.
    Scale(ScaleArgs),
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let default = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose)?;

    match cli.command {
        Commands::Scale(args) => commands::scale::run(&cli.global, args).await,
    }
}
