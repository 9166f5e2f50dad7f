//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest crawler.

use anyhow::Context;
use catalog_harvest::config::{load_config_with_hash, validate_roots, Config};
use catalog_harvest::crawler::run_crawl;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: crawl a brand → collection → product catalog into JSON
///
/// Each configured brand page is crawled in turn; its collections and
/// products are fetched concurrently and the assembled brand is written to
/// `<results-dir>/<brand>.json` before the next brand starts.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "Crawl a hierarchical product catalog into JSON", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Brand page to crawl instead of the configured roots (repeatable)
    #[arg(long = "root", value_name = "URL")]
    roots: Vec<String>,

    /// Write results here instead of the configured directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if !cli.roots.is_empty() {
        validate_roots(&cli.roots)?;
        config.roots = cli.roots;
    }
    if let Some(dir) = cli.output_dir {
        config.output.results_dir = dir.display().to_string();
    }

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let report = run_crawl(config).await?;
    tracing::info!(
        "Crawl finished: {} brands written, {} failed",
        report.persisted,
        report.failed
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
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

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!(
        "  Retries: {} (linear backoff, {}ms unit)",
        config.crawler.max_retries, config.crawler.backoff_unit_ms
    );
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!("  Page parameter: {}", config.crawler.page_param);

    println!("\nUser Agents: {}", config.user_agent.pool.len());

    println!("\nOutput:");
    println!("  Results directory: {}", config.output.results_dir);

    println!("\nRoots ({}):", config.roots.len());
    for root in &config.roots {
        println!("  - {}", root);
    }

    if config.roots.is_empty() {
        println!("\n✗ No roots configured; pass --root or add `roots` to the config");
    } else {
        println!("\n✓ Configuration is valid");
    }
}
