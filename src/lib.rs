//! Booknote - book metadata scraper and note writer.
//!
//! This library provides functionality for:
//! - Finding a book on Russian and English bookseller sites (Labirint,
//!   Livelib, Litres, Ozon, Goodreads) through a web search
//! - Extracting bibliographic records and merging them field by field
//! - Translating genre and tag labels through a persistent cache
//! - Rendering the chosen record as a markdown note

pub mod book;
pub mod config;
pub mod console;
pub mod error;
pub mod finder;
pub mod logging;
pub mod note;
pub mod person;
pub mod pipeline;
pub mod scrapers;
pub mod search;
pub mod selection;
#[cfg(test)]
mod testing;
pub mod translations;
pub mod translator;
pub mod utils;

// Re-export commonly used types
pub use book::{Book, SiteId};
pub use config::Config;
pub use console::Console;
pub use error::{CacheError, ConfigError, FinderError, NoteError, ScraperError, SearchError, TranslationError};
pub use finder::BookFinder;
pub use person::Person;
pub use pipeline::{Outcome, Pipeline};
pub use scrapers::{ExtractorRegistry, SiteExtractor};
pub use translations::TranslationCache;
