//! Blurb-Harvest main entry point
//!
//! This is the command-line interface for the Blurb-Harvest listing harvester.

use anyhow::Context;
use blurb_harvest::config::{load_config_with_hash, load_tags, validate, Config, RequestedCount};
use blurb_harvest::crawler::Harvest;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Blurb-Harvest: a polite archive listing harvester
///
/// Walks an archive search listing page by page and records each work's id,
/// chapter count, word count, kudos and title to a CSV file. Values given on
/// the command line override those from --config.
#[derive(Parser, Debug)]
#[command(name = "blurb-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Harvest work IDs and stats from an archive search", long_about = None)]
struct Cli {
    /// A single URL pointing to an archive search page
    #[arg(value_name = "URL", required_unless_present = "config")]
    url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// CSV output file name (without extension)
    #[arg(long = "out-csv", value_name = "NAME")]
    out_csv: Option<String>,

    /// Directory to write the CSV and readme into
    #[arg(long = "out-dir", value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "USER_AGENT")]
    header: Option<String>,

    /// How many works to retrieve: a number, or "a"/"all" for everything
    #[arg(long = "num-to-retrieve", value_name = "N")]
    num_to_retrieve: Option<RequestedCount>,

    /// Only retrieve ids for multichapter works
    #[arg(long = "multichapter-only")]
    multichapter_only: bool,

    /// CSV file of tags, one per row; each tag gets its own harvest run
    #[arg(long = "tag-csv", value_name = "FILE")]
    tag_csv: Option<PathBuf>,

    /// Listing page to start from
    #[arg(long = "start-page", value_name = "PAGE")]
    start_page: Option<u32>,

    /// Skip works already present in an existing output CSV
    #[arg(long)]
    resume: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show which URLs would be harvested, then exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = resolve_config(&cli)?;

    let mut harvest = Harvest::new(config);
    if let Some(hash) = config_hash {
        harvest = harvest.with_config_hash(hash);
    }

    if cli.dry_run {
        handle_dry_run(&harvest);
        return Ok(());
    }

    tracing::info!("processing...");
    let summary = harvest.run().await.context("harvest failed")?;
    tracing::info!(
        "Harvest completed: {} works over {} runs",
        summary.total_recorded(),
        summary.runs.len()
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("blurb_harvest=info,warn"),
            1 => EnvFilter::new("blurb_harvest=debug,info"),
            2 => EnvFilter::new("blurb_harvest=trace,debug"),
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

/// Builds the effective configuration from --config and the CLI overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            let url = cli
                .url
                .clone()
                .context("a search URL is required without --config")?;
            (Config::for_url(url), None)
        }
    };

    if let Some(url) = &cli.url {
        config.search.url = url.clone();
    }
    if let Some(name) = &cli.out_csv {
        config.output.name = name.clone();
    }
    if let Some(dir) = &cli.out_dir {
        config.output.directory = dir.clone();
    }
    if let Some(header) = &cli.header {
        config.fetch.user_agent = header.clone();
    }
    if let Some(requested) = cli.num_to_retrieve {
        config.search.requested = requested;
    }
    if let Some(start_page) = cli.start_page {
        config.search.start_page = start_page;
    }
    if cli.multichapter_only {
        config.search.multichapter_only = true;
    }
    if cli.resume {
        config.output.resume = true;
    }
    if let Some(path) = &cli.tag_csv {
        config.search.tags = load_tags(path)
            .with_context(|| format!("failed to read tags from {}", path.display()))?;
        tracing::info!("Loaded {} tags from {}", config.search.tags.len(), path.display());
    }

    validate(&config).context("invalid configuration")?;

    Ok((config, hash))
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(harvest: &Harvest) {
    let config = harvest.config();

    println!("=== Blurb-Harvest Dry Run ===\n");

    println!("Search:");
    println!("  URL: {}", config.search.url);
    println!("  Requested: {}", config.search.requested);
    println!("  Start page: {}", config.search.start_page);
    println!("  Multichapter only: {}", config.search.multichapter_only);

    println!("\nFetch:");
    println!("  User agent: {:?}", config.fetch.user_agent);
    println!("  Politeness delay: {}ms", config.fetch.politeness_delay);
    println!("  Rate-limit backoff: {}ms", config.fetch.rate_limit_backoff);
    match config.fetch.max_rate_limit_retries {
        Some(max) => println!("  Max rate-limit retries: {}", max),
        None => println!("  Max rate-limit retries: unbounded"),
    }

    println!("\nFilter:");
    println!("  Word floor: {}", config.filter.word_floor);

    println!("\nOutput:");
    println!(
        "  CSV: {}",
        config
            .output
            .directory
            .join(format!("{}.csv", config.output.name))
            .display()
    );
    println!("  Resume: {}", config.output.resume);

    let runs = harvest.planned_runs();
    println!("\nRuns ({}):", runs.len());
    for (tag, url) in &runs {
        println!("  - {}: {}", tag.as_deref().unwrap_or("(no tag)"), url);
    }

    println!("\n✓ Configuration is valid");
}
