//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest catalog crawler.

use catalog_harvest::config::{load_config_or_default, Config};
use catalog_harvest::crawler::crawl;
use catalog_harvest::output::{load_statistics, print_statistics};
use catalog_harvest::sources::{distinct_sources, load_sources, pending_sources};
use catalog_harvest::storage::{JsonProgressStore, ProgressStore};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a resumable catalog crawler
///
/// Catalog-Harvest walks every page of each collection in the source list,
/// extracts one record per product card and rewrites its dataset and
/// progress files after every page, so an interrupted run picks up where
/// it stopped.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "A resumable catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults apply without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which sources would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the progress file and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }
    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config).await?;
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
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows pending sources
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!("  Settle delay: {}ms", config.crawler.settle_delay_ms);
    println!("  Scroll delay: {}ms", config.crawler.scroll_delay_ms);

    println!("\nRenderer:");
    println!("  Kind: {:?}", config.renderer.kind);
    if let Some(endpoint) = &config.renderer.endpoint {
        println!("  Endpoint: {}", endpoint);
    }
    println!("  User agent: {}", config.renderer.user_agent);

    println!("\nOutput:");
    println!("  Progress: {}", config.output.progress_path);
    println!(
        "  Dataset: {} ({:?})",
        config.output.dataset_path, config.output.format
    );

    let sources = distinct_sources(&load_sources(Path::new(&config.input.sources_path))?);
    let progress = JsonProgressStore::open(Path::new(&config.output.progress_path));
    let pending = pending_sources(&sources, &progress);

    println!("\nSources ({}):", sources.len());
    for source in &sources {
        match progress.count(source) {
            Some(count) => println!("  - {} (harvested, {} records)", source, count),
            None => println!("  * {}", source),
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} sources, skipping {} already harvested",
        pending.len(),
        sources.len() - pending.len()
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the progress file
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Progress: {}\n", config.output.progress_path);

    let progress = JsonProgressStore::open(Path::new(&config.output.progress_path));

    // The source list is optional here; without it there is no pending count.
    let sources_path = Path::new(&config.input.sources_path);
    let sources = if sources_path.exists() {
        load_sources(sources_path).ok()
    } else {
        None
    };

    let stats = load_statistics(&progress, sources.as_deref());
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Sources: {}, progress: {}, dataset: {}",
        config.input.sources_path,
        config.output.progress_path,
        config.output.dataset_path
    );

    match crawl(config).await {
        Ok(summary) => {
            let retried = summary.sources_failed - summary.sources_partial;
            if retried > 0 {
                tracing::warn!(
                    "{} sources failed before any page was saved; they will be retried on the next run",
                    retried
                );
            }
            if summary.sources_partial > 0 {
                tracing::warn!(
                    "{} sources failed after saving some pages; remove them from {} to crawl them again",
                    summary.sources_partial,
                    config.output.progress_path
                );
            }
            if summary.page_errors > 0 {
                tracing::warn!(
                    "{} pages failed to render and were saved with no items",
                    summary.page_errors
                );
            }
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
