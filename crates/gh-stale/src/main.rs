//! gh-stale: warn about and close inactive issues and pull requests
//!
//! One invocation is one run: the open items of a repository are walked
//! until they are exhausted or the operation budget is spent. Progress is
//! kept in a state file so the next run continues where this one stopped.

use anyhow::{bail, Context, Result};
use clap::Parser;
use gh_client::{connect, TokenResolver};
use gh_stale_config::StaleOptions;
use gh_stale_core::{FileStateStore, RunReport, StaleEngine};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gh-stale")]
#[command(about = "Mark and close stale GitHub issues and pull requests")]
struct Cli {
    /// Repository to process (owner/name)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: String,

    /// GitHub host, for GitHub Enterprise
    #[arg(long, env = "GH_HOST")]
    host: Option<String>,

    /// Options file (defaults to .gh-stale.toml in the current or home directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the processed-item state is kept between runs
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Login assumed for the bot if the authenticated user cannot be fetched
    #[arg(long, env = "GITHUB_ACTOR")]
    actor: Option<String>,

    /// Log what would happen without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Maximum number of API operations for this run
    #[arg(long)]
    operations_per_run: Option<i64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        // logger is not up yet
        eprintln!("Loaded environment from {:?}", path);
    }

    let cli = Cli::parse();
    init_logger(cli.verbose);

    let (owner, repo) = split_repository(&cli.repo)?;

    let mut options = StaleOptions::load(cli.config.as_deref())?;
    if cli.dry_run {
        options.debug_only = true;
    }
    if let Some(operations) = cli.operations_per_run {
        options.operations_per_run = operations;
    }

    let state_file = match cli.state_file {
        Some(path) => path,
        None => gh_stale_config::state_file_path(owner, repo)?,
    };
    log::debug!("Using state file {:?}", state_file);

    let client = connect(&TokenResolver::new(), cli.host.as_deref())
        .await
        .context("Failed to create GitHub client")?;
    let store = FileStateStore::new(state_file);

    let mut engine = StaleEngine::new(client, store, owner, repo, options)?;
    if let Some(actor) = cli.actor {
        engine = engine.with_fallback_actor(actor);
    }

    log::info!("Processing {}/{}", owner, repo);
    let report = engine.run().await;
    print_summary(&report);

    Ok(())
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` wins over both
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Split `owner/name` into its two parts
fn split_repository(full_name: &str) -> Result<(&str, &str)> {
    match full_name.trim().split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner, repo))
        }
        _ => bail!("Repository must be given as owner/name, got {:?}", full_name),
    }
}

fn print_summary(report: &RunReport) {
    println!("Marked stale:     {}", report.stale_issues.len());
    println!("Closed:           {}", report.closed_issues.len());
    println!("Un-staled:        {}", report.removed_label_issues.len());
    println!("Branches deleted: {}", report.deleted_branch_issues.len());
    println!("Operations left:  {}", report.remaining_operations);
    if report.completed_cycle {
        println!("All open items processed; the next run starts over.");
    } else {
        println!("Run stopped early; the next run resumes from the saved state.");
    }
}
