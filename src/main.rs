//! Sumi-Seek main entry point
//!
//! This is the command-line interface for the Sumi-Seek text finder.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use sumi_seek::config::{load_config_with_hash, validate, Config, FinderConfig};
use sumi_seek::output::{print_statistics, write_markdown_summary, RunStatistics, RunSummary};
use sumi_seek::url::parse_start_uri;
use sumi_seek::{Coordinator, CrawlEvent, CrawlState, PageState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

/// Sumi-Seek: finds a piece of text on a website
///
/// Sumi-Seek crawls outward from a start page with a fixed pool of workers
/// and reports every page containing the text. While it runs, type `p` to
/// pause, `r` to resume and `s` or `q` to stop.
#[derive(Parser, Debug)]
#[command(name = "sumi-seek")]
#[command(version)]
#[command(about = "Finds a piece of text on a website", long_about = None)]
struct Cli {
    /// Page the crawl starts from (absolute http or https URL)
    #[arg(value_name = "URL")]
    url: String,

    /// Text to search for (case-sensitive)
    #[arg(value_name = "TEXT")]
    text: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Total page budget (overrides the configuration)
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Number of concurrent workers (overrides the configuration)
    #[arg(long, value_name = "N")]
    max_workers: Option<usize>,

    /// Write a markdown summary of the run to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(max_pages) = cli.max_pages {
        config.finder.max_pages = max_pages;
    }
    if let Some(max_workers) = cli.max_workers {
        config.finder.max_workers = max_workers;
    }
    validate(&config).context("Invalid configuration")?;
    check_input(&cli.url, &cli.text, &config.finder)?;

    let coordinator = Coordinator::from_config(&config)?;
    let reporter = tokio::spawn(report_events(coordinator.subscribe()));

    let started_at = Utc::now();
    coordinator.start(&cli.url, &cli.text).await?;
    println!("Searching for \"{}\" from {}", cli.text, cli.url);
    println!("Commands: p = pause, r = resume, s/q = stop");

    run_until_stopped(&coordinator).await?;
    let finished_at = Utc::now();

    let stats = RunStatistics::from_pages(&coordinator.pages());
    coordinator.dispose().await;
    drop(coordinator);

    // The reporter ends once the event channel closes
    if tokio::time::timeout(Duration::from_secs(1), reporter)
        .await
        .is_err()
    {
        tracing::debug!("Event reporter still draining, abandoning it");
    }

    println!();
    print_statistics(&stats);

    let summary_path = cli
        .summary
        .or_else(|| config.output.summary_path.as_ref().map(PathBuf::from));
    if let Some(path) = summary_path {
        let summary = RunSummary {
            start_uri: cli.url.clone(),
            search_text: cli.text.clone(),
            started_at,
            finished_at,
            config_hash,
            stats,
        };
        write_markdown_summary(&summary, &path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        println!("\n✓ Summary written to: {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_seek=info,warn"),
            1 => EnvFilter::new("sumi_seek=debug,info"),
            2 => EnvFilter::new("sumi_seek=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Rejects obviously unusable input before anything is started
fn check_input(url: &str, text: &str, finder: &FinderConfig) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        bail!("The start URL cannot be empty");
    }
    if text.is_empty() {
        bail!("The search text cannot be empty");
    }
    parse_start_uri(url).with_context(|| format!("'{}' is not an absolute http(s) URL", url))?;
    if finder.max_workers > finder.max_pages {
        bail!(
            "max-workers ({}) must not exceed max-pages ({})",
            finder.max_workers,
            finder.max_pages
        );
    }
    Ok(())
}

/// Serves terminal commands until the crawl reaches `Stopped`
async fn run_until_stopped(coordinator: &Coordinator) -> anyhow::Result<()> {
    let mut state = coordinator.watch_state();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            stopped = state.wait_for(|state| *state == CrawlState::Stopped) => {
                stopped.context("Coordinator went away")?;
                return Ok(());
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping crawl");
                coordinator.stop().await?;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => handle_command(coordinator, line.trim()).await?,
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
        }
    }
}

async fn handle_command(coordinator: &Coordinator, command: &str) -> anyhow::Result<()> {
    match command {
        "p" => coordinator.pause()?,
        "r" => coordinator.resume()?,
        "s" | "q" => coordinator.stop().await?,
        "" => {}
        other => println!("Unknown command '{}' (p = pause, r = resume, s/q = stop)", other),
    }
    Ok(())
}

/// Prints matches and logs the rest of the event stream
async fn report_events(mut events: broadcast::Receiver<CrawlEvent>) {
    loop {
        match events.recv().await {
            Ok(CrawlEvent::PageProcessed(page)) if page.state == PageState::Found => {
                println!("Found: {}", page.uri);
            }
            Ok(CrawlEvent::PageProcessed(page)) => {
                tracing::debug!("Processed {} ({})", page.uri, page.state);
            }
            Ok(CrawlEvent::Progress(percent)) => {
                tracing::info!("Progress: {:.1}%", percent);
            }
            Ok(CrawlEvent::StateChanged(state)) => {
                println!("[{}]", state);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Event reporter lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
