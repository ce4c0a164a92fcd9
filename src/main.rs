//! Wiki-Harvest main entry point
//!
//! This is the command-line interface for the Wiki-Harvest paragraph crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wiki_harvest::config::{load_config_with_hash, validate_max_levels, Config};
use wiki_harvest::crawler::crawl;
use wiki_harvest::output::{load_statistics, print_statistics};
use wiki_harvest::storage::SqliteStorage;

/// Wiki-Harvest: a breadth-first encyclopedia paragraph harvester
///
/// Wiki-Harvest starts from tagged seed articles, stores every prose
/// paragraph it finds in SQLite, and follows article links level by level
/// up to a fixed depth.
#[derive(Parser, Debug)]
#[command(name = "wiki-harvest")]
#[command(version)]
#[command(about = "A breadth-first encyclopedia paragraph harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the number of levels to crawl
    #[arg(long, value_name = "N")]
    levels: Option<u32>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(levels) = cli.levels {
        validate_max_levels(levels).context("invalid --levels")?;
        config.crawler.max_levels = levels;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_harvest=info,warn"),
            1 => EnvFilter::new("wiki_harvest=debug,info"),
            2 => EnvFilter::new("wiki_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration and seeds
fn handle_dry_run(config: &Config) {
    println!("=== Wiki-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Levels: {}", config.crawler.max_levels);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Page timeout: {}s", config.crawler.page_timeout_secs);

    println!("\nSite:");
    println!("  Base domain: {}", config.site.base_domain);
    println!("  Content region: #{}", config.site.content_region_id);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - [{}] {}", seed.tag, seed.url);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} levels from {} seed URLs",
        config.crawler.max_levels,
        config.seeds.len()
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;
    let stats = load_statistics(&storage).context("failed to read statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} levels from {} seed URLs with {} workers",
        config.crawler.max_levels,
        config.seeds.len(),
        config.crawler.concurrency
    );

    let report = crawl(config, config_hash).await.context("crawl failed")?;

    tracing::info!("Crawl completed successfully");
    println!("Pages crawled: {}", report.stats.pages_crawled);
    println!("Paragraphs collected: {}", report.stats.paragraphs);
    if report.stats.pages_failed > 0 {
        println!("Pages failed: {}", report.stats.pages_failed);
    }

    Ok(())
}
