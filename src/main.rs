//! Booknote CLI - find a book online and write a markdown note for it.

use anyhow::{Context, Result};
use booknote::config::Config;
use booknote::console::Console;
use booknote::finder::BookFinder;
use booknote::logging;
use booknote::pipeline::{Outcome, Pipeline};
use booknote::scrapers::HttpFetcher;
use booknote::search::GoogleSearch;
use booknote::selection::StdinOperator;
use booknote::translations::TranslationCache;
use booknote::translator::provider_from_config;
use clap::Parser;
use std::path::PathBuf;

/// Book metadata scraper and note writer.
#[derive(Parser, Debug)]
#[command(name = "booknote")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Title (optionally with the author) to search for.
    query: String,

    /// Read configuration from this file instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the note into this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Do not fill in missing details from the supplement sites.
    #[arg(long)]
    no_supplement: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    console.section("Booknote");

    // Load configuration
    console.step("Loading configuration...");
    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path).context("Failed to load configuration")?;
    logging::init(config.scraping.debug)?;

    // Check if this is first run (search key not configured)
    if !config.search.is_configured() {
        console.warning(&format!(
            "Search API key not configured. Please edit: {}",
            config_path.display()
        ));
        console.info("Set your search API key and engine id in the config file and run again.");
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;
    if let Some(dir) = args.output_dir {
        config.note.output_directory = dir;
    }
    console.success("Configuration loaded");

    let translations_path = config.translations_path()?;
    let mut cache = TranslationCache::load(
        &translations_path,
        provider_from_config(&config.translation),
    )
    .with_context(|| {
        format!(
            "Failed to load translation cache {}",
            translations_path.display()
        )
    })?;

    let fetcher =
        HttpFetcher::new(config.scraping.clone()).context("Failed to create HTTP client")?;
    let finder = BookFinder::new(
        config.search.clone(),
        Box::new(GoogleSearch::new(config.search.clone())),
        Box::new(fetcher),
    );
    let mut pipeline = Pipeline::new(
        finder,
        Box::new(StdinOperator::new(Console::new())),
        config.note.clone(),
        !args.no_supplement,
        Console::new(),
    );

    let outcome = pipeline.run(&args.query, &mut cache).await;

    // Keep new translations even if the run failed.
    if cache.is_dirty() {
        match cache.save() {
            Ok(()) => tracing::debug!(path = %cache.filepath().display(), "translation cache saved"),
            Err(e) => console.error(&format!("Failed to save translation cache: {}", e)),
        }
    }

    // Status lines go to stderr; stdout carries only the result.
    match outcome? {
        Outcome::NothingFound => println!("Nothing found"),
        Outcome::Declined => console.info("No book chosen"),
        Outcome::Written(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            println!("file \"{}\" created", name);
        }
    }

    Ok(())
}
