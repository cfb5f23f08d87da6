//! Sumi-Scribe main entry point
//!
//! This is the command-line interface for the Sumi-Scribe article crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use sumi_scribe::config::{load_config_with_hash, validate, Config, OrderingMode};
use sumi_scribe::crawler::{CrawlController, CrawlEvent};
use sumi_scribe::output::stats::{corpus_statistics, print_statistics};
use sumi_scribe::search;
use sumi_scribe::storage::{ArticleStore, JsonArticleStore};
use tracing_subscriber::EnvFilter;

/// Sumi-Scribe: a polite, cache-aware article crawler
///
/// Sumi-Scribe crawls a single site from a seed URL, extracts articles into a
/// local cache and searches the cached corpus by keyword.
#[derive(Parser, Debug)]
#[command(name = "sumi-scribe")]
#[command(version)]
#[command(about = "A polite, cache-aware article crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; built-in defaults are used without one
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site starting from SEED (Ctrl-C stops after the current batch)
    Crawl {
        /// Absolute http(s) URL to start from
        seed: String,

        /// Maximum number of pages to process
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        budget: Option<u64>,

        /// Visit pages in discovery order instead of newest-first
        #[arg(long)]
        fifo: bool,
    },

    /// Search cached articles by keyword
    Search {
        /// Case-insensitive keyword matched against titles and content
        keyword: String,
    },

    /// Show statistics for the article cache
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_ref())?;

    match cli.command {
        Command::Crawl { seed, budget, fifo } => handle_crawl(config, &seed, budget, fifo).await,
        Command::Search { keyword } => handle_search(&config, &keyword),
        Command::Stats => handle_stats(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scribe=info,warn"),
            1 => EnvFilter::new("sumi_scribe=debug,info"),
            2 => EnvFilter::new("sumi_scribe=trace,debug"),
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

/// Loads the config file when one is given, otherwise the defaults
fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles the crawl command: runs one crawl and prints its events
async fn handle_crawl(
    mut config: Config,
    seed: &str,
    budget: Option<u64>,
    fifo: bool,
) -> anyhow::Result<()> {
    if budget.is_some() {
        config.crawler.page_budget = budget;
    }
    if fifo {
        config.crawler.ordering = OrderingMode::Fifo;
    }
    validate(&config)?;

    let store = Arc::new(
        JsonArticleStore::open(&config.output.cache_dir).context("Failed to open article cache")?,
    );
    tracing::info!("{} articles in cache", store.len());

    let mut controller = CrawlController::new(Arc::new(config), store);
    let mut events = controller.start(seed)?;

    let stop = controller.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current batch");
            stop.request();
        }
    });

    while let Some(event) = events.recv().await {
        print_event(&event);
    }

    if let Some(session) = controller.wait().await? {
        println!("\n✓ Crawled {} pages from {}", session.pages_crawled, session.seed);
    }

    Ok(())
}

fn print_event(event: &CrawlEvent) {
    match event {
        CrawlEvent::Started { seed, budget } => match budget {
            Some(budget) => println!("Crawling {} (up to {} pages)", seed, budget),
            None => println!("Crawling {}", seed),
        },
        CrawlEvent::Progress { .. } => {}
        CrawlEvent::ArticleReady {
            pages_crawled,
            budget,
            record,
            from_cache,
        } => {
            let source = if *from_cache { " (cached)" } else { "" };
            println!(
                "[{}] {}{}\n    {}",
                progress_label(*pages_crawled, *budget),
                record.title,
                source,
                record.url
            );
        }
        CrawlEvent::Error {
            pages_crawled,
            budget,
            message,
            ..
        } => {
            println!("[{}] ✗ {}", progress_label(*pages_crawled, *budget), message);
        }
        CrawlEvent::Completed {
            pages_crawled,
            reason,
        } => {
            println!("\nCrawl finished: {} ({} pages)", reason, pages_crawled);
        }
    }
}

fn progress_label(pages_crawled: u64, budget: Option<u64>) -> String {
    match budget {
        Some(budget) => format!("{}/{}", pages_crawled, budget),
        None => pages_crawled.to_string(),
    }
}

/// Handles the search command
fn handle_search(config: &Config, keyword: &str) -> anyhow::Result<()> {
    let store =
        JsonArticleStore::open(&config.output.cache_dir).context("Failed to open article cache")?;

    let outcome = search(&store, keyword);
    if let Some(note) = &outcome.note {
        println!("{}", note);
        return Ok(());
    }

    println!("Found {} results\n", outcome.len());
    for hit in &outcome.hits {
        println!("{}", hit.title);
        println!("  URL: {}", hit.url);
        if !hit.publish_date.is_empty() {
            println!("  Published: {}", hit.publish_date);
        }
        println!("  {}", highlight_preview(&hit.preview, hit.highlight, keyword));
        println!();
    }

    Ok(())
}

/// Wraps the highlighted keyword occurrence in brackets
fn highlight_preview(preview: &str, highlight: Option<usize>, keyword: &str) -> String {
    let Some(start) = highlight else {
        return preview.to_string();
    };

    let keyword_len = keyword.trim().chars().count();
    let chars: Vec<char> = preview.chars().collect();
    let start = start.min(chars.len());
    let end = (start + keyword_len).min(chars.len());

    let before: String = chars[..start].iter().collect();
    let matched: String = chars[start..end].iter().collect();
    let after: String = chars[end..].iter().collect();
    format!("{}[{}]{}", before, matched, after)
}

/// Handles the stats command: shows statistics for the article cache
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Cache: {}\n", config.output.cache_dir);

    let store =
        JsonArticleStore::open(&config.output.cache_dir).context("Failed to open article cache")?;
    print_statistics(&corpus_statistics(&store));

    Ok(())
}
