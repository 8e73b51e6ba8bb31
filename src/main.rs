mod commands;
mod config;
mod display;
mod error;
mod github;
mod presenter;

use clap::{CommandFactory, Parser};
use config::{FilterConfig, TeamRef};
use error::{Result, YagdError};
use github::executor::{require_program, ProcessExecutor};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yagd",
    version,
    about = "Visualize pull requests across multiple repos and users."
)]
pub struct Cli {
    /// Paths of the repos cloned on your machine
    #[arg(short, long, num_args = 1.., value_name = "PATH")]
    repos: Vec<PathBuf>,

    /// Include pull requests you already reviewed
    #[arg(long)]
    reviewed: bool,

    /// Include pull requests created by you
    #[arg(short, long)]
    mine: bool,

    /// Show the pull request url
    #[arg(short, long)]
    urls: bool,

    /// Show pull requests by a list of users
    #[arg(short, long, num_args = 1.., value_name = "LOGIN")]
    authors: Vec<String>,

    /// Fetch authors from a list of GitHub teams (replaces --authors)
    #[arg(long, num_args = 1.., value_name = "ORG/TEAM")]
    authors_from_teams: Vec<TeamRef>,

    /// Only show draft pull requests
    #[arg(short, long)]
    drafts: bool,

    /// Show column headers
    #[arg(long)]
    headers: bool,

    /// Show the pull request branch
    #[arg(long)]
    show_branch: bool,

    /// Show the pull request author name
    #[arg(long)]
    show_author: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Enables debug logging
    #[arg(long)]
    debug: bool,

    /// Use a saved config environment
    #[arg(short = 'c', long)]
    use_config: bool,

    /// Saved config file to use instead of the default location
    #[arg(long, value_name = "FILE", requires = "use_config")]
    config: Option<PathBuf>,
}

impl Cli {
    fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            repos: self.repos.clone(),
            authors: self.authors.clone(),
            authors_from_teams: self.authors_from_teams.clone(),
            include_reviewed: self.reviewed,
            include_mine: self.mine,
            show_drafts: self.drafts,
            show_urls: self.urls,
            show_headers: self.headers,
            show_branch: self.show_branch,
            show_author: self.show_author,
        }
    }
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_filter_config(cli: &Cli) -> Result<FilterConfig> {
    let mut filter = cli.filter_config();

    if cli.use_config {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => config::config_path()?,
        };
        let saved = config::load_saved_config(&path)?;
        filter = filter.overlay(saved);
        tracing::debug!(path = %path.display(), config = ?filter, "applied saved config");
    }

    filter.validate()?;
    Ok(filter)
}

/// Returns whether every repository was listed successfully.
fn run(cli: &Cli) -> Result<bool> {
    let filter = load_filter_config(cli)?;
    require_program(github::GH)?;

    let mut console = display::Terminal::new();
    let report = commands::fetch::run(&filter, &ProcessExecutor, &mut console, cli.json)?;
    Ok(report.failures() == 0)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(YagdError::MissingConfiguration) => {
            display::error(&YagdError::MissingConfiguration.to_string());
            let _ = Cli::command().print_help();
            std::process::exit(1);
        }
        Err(e) => {
            display::error(&e.to_string());
            std::process::exit(1);
        }
    }
}
