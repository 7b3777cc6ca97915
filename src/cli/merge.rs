//! Merge command - run the merger over every configured repository

use crate::cli::CliProgress;
use crate::cli::style::Stylize;
use anstream::println;
use justmerge::auth::get_github_auth;
use justmerge::config::{CONFIG_DIR, RepoConfig, discover_configs, load_config};
use justmerge::error::{Error, Result};
use justmerge::merge::run_batch;
use justmerge::platform::GitHubService;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeCommandOptions {
    /// Print policy, rejections and response details
    pub verbose: bool,
    /// Evaluate everything but never merge, approve or comment
    pub dry_run: bool,
    /// Use every `*.toml` file in `conf.d`
    pub all: bool,
    /// Explicit config files
    pub config_files: Vec<PathBuf>,
}

/// Pick the config files to process
///
/// Exactly one of `--all` or explicit file names must be given.
pub fn select_config_files(options: &MergeCommandOptions) -> Result<Vec<PathBuf>> {
    match (options.all, options.config_files.is_empty()) {
        (false, true) => Err(Error::Config(
            "No config files provided and --all not used.".to_string(),
        )),
        (true, false) => Err(Error::Config(
            "Make up your mind. Either use --all or specify files by name.".to_string(),
        )),
        (true, true) => discover_configs(Path::new(CONFIG_DIR)),
        (false, false) => Ok(options.config_files.clone()),
    }
}

/// Run the merge command
#[allow(clippy::future_not_send)]
pub async fn run_merge(options: MergeCommandOptions) -> Result<()> {
    let paths = select_config_files(&options)?;

    // Every config must be valid before anything touches the network
    let configs = paths
        .iter()
        .map(|path| load_config(path))
        .collect::<Result<Vec<RepoConfig>>>()?;
    debug!(count = configs.len(), "loaded configs");

    let auth = get_github_auth().await?;
    debug!(source = ?auth.source, "authenticated");
    let platform = match &auth.api_url {
        Some(api_url) => GitHubService::with_api_url(&auth.token, api_url)?,
        None => GitHubService::new(&auth.token)?,
    };

    for (i, config) in configs.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let progress = CliProgress::new(options.verbose || config.verbose);
        let report = run_batch(
            &platform,
            &config.repository(),
            &config.options,
            options.dry_run,
            &progress,
        )
        .await?;

        if options.verbose || config.verbose {
            println!(
                "{}",
                format!(
                    "{}: {} PR(s) looked at, {} merge action(s)",
                    config.repository(),
                    report.decisions.len(),
                    report.success_count()
                )
                .muted()
            );
        }
    }

    Ok(())
}
