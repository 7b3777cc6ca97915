//! justmerge - merge the GitHub pull requests that are ready to go

mod cli;

use clap::Parser;
use cli::merge::{MergeCommandOptions, run_merge};
use cli::style::Stylize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "justmerge")]
#[command(about = "Merge open pull requests that pass checks and policy")]
#[command(version)]
struct Cli {
    /// Print policy, rejected PRs and API details
    #[arg(short, long)]
    verbose: bool,

    /// Evaluate PRs but do not merge, approve or comment
    #[arg(short, long)]
    dry_run: bool,

    /// Process every *.toml file in conf.d
    #[arg(short, long)]
    all: bool,

    /// Repository config files (TOML)
    #[arg(value_name = "CONFIGFILE")]
    configfile: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = MergeCommandOptions {
        verbose: cli.verbose,
        dry_run: cli.dry_run,
        all: cli.all,
        config_files: cli.configfile,
    };

    if let Err(e) = run_merge(options).await {
        anstream::eprintln!("{} {e}", "Error:".error());
        std::process::exit(1);
    }
}
