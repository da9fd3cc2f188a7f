//! Error types for the Booknote application.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use thiserror::Error;

/// Error type for fetching pages from bookseller sites.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The URL points outside the extractor's domain
    #[error("Domain not allowed for {site}: {url}")]
    DomainNotAllowed { site: &'static str, url: String },
}

/// Error type for the web search collaborator.
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request to the search API failed
    #[error("Search request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Search API returned an error response
    #[error("Search API error: {0}")]
    ApiError(String),

    /// Failed to build the request URL
    #[error("Invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Error type for translation operations.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// HTTP request to API failed
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error: {0}")]
    ApiError(String),

    /// The external translation command could not be run
    #[error("Translation command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },
}

/// Error type for collecting candidates across sites.
///
/// Page fetch failures are absorbed; only search and translation
/// failures surface here.
#[derive(Error, Debug)]
pub enum FinderError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// Error type for the persisted translation cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to read cache file
    #[error("Failed to read translation cache: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse JSON
    #[error("Failed to parse translation cache JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Failed to write cache file
    #[error("Failed to save translation cache: {0}")]
    WriteError(String),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Error type for writing the output note.
#[derive(Error, Debug)]
pub enum NoteError {
    /// The book has no file name yet
    #[error("Book has no file name; finalize it before writing")]
    MissingFileName,

    /// Failed to create or write the note file
    #[error("Failed to write note '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
