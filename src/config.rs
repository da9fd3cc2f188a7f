//! Configuration management for Booknote.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::book::SiteId;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "booknote";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Default translation cache filename.
const TRANSLATIONS_FILENAME: &str = "translations.json";

/// Placeholder value for unconfigured API keys.
const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// The search API returns at most this many results per request.
const MAX_RESULTS_PER_SITE: u32 = 10;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web search settings.
    pub search: SearchConfig,

    /// Genre/tag translation settings.
    pub translation: TranslationConfig,

    /// Web scraping settings.
    pub scraping: ScrapingConfig,

    /// Output note settings.
    pub note: NoteConfig,

    /// File paths.
    pub paths: PathsConfig,
}

/// Web search configuration (Google Custom Search).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// API key (required).
    pub api_key: String,

    /// Programmable search engine identifier (`cx`).
    pub engine_id: String,

    /// Endpoint of the search API.
    pub base_url: String,

    /// Number of result URLs requested per site.
    pub results_per_site: u32,

    /// Site priority for queries in Cyrillic (or any non-Latin script).
    pub default_order: Vec<SiteId>,

    /// Site priority for queries starting with a Latin letter.
    pub latin_order: Vec<SiteId>,

    /// Sites used, in order, to fill in fields the chosen candidate lacks.
    /// An empty list disables enrichment.
    pub supplement: Vec<SiteId>,

    /// Pause before searching the next site in the order.
    pub site_switch_delay_sec: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: API_KEY_PLACEHOLDER.to_string(),
            engine_id: String::new(),
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
            results_per_site: 5,
            default_order: vec![SiteId::Labirint, SiteId::Livelib, SiteId::Litres, SiteId::Ozon],
            latin_order: vec![SiteId::Goodreads, SiteId::Livelib, SiteId::Labirint],
            supplement: vec![SiteId::Litres],
            site_switch_delay_sec: 2.0,
        }
    }
}

impl SearchConfig {
    /// Checks if the API key is configured (not placeholder).
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != API_KEY_PLACEHOLDER
    }
}

/// Which translation backend resolves cache misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationBackend {
    /// External command line tool (`translate ru en <text>`).
    Command,
    /// OpenAI-compatible chat completions API.
    Api,
}

/// Translation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Backend used on cache misses.
    pub provider: TranslationBackend,

    /// Command name or path for the command backend.
    pub command: String,

    /// Source language code.
    pub from_lang: String,

    /// Target language code.
    pub to_lang: String,

    /// Chat API settings for the api backend.
    pub api: ApiConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationBackend::Command,
            command: "translate".to_string(),
            from_lang: "ru".to_string(),
            to_lang: "en".to_string(),
            api: ApiConfig::default(),
        }
    }
}

/// API configuration for LLM endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key (required for the api backend).
    pub key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: API_KEY_PLACEHOLDER.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl ApiConfig {
    /// Checks if the API key is configured (not placeholder).
    pub fn is_configured(&self) -> bool {
        !self.key.is_empty() && self.key != API_KEY_PLACEHOLDER
    }
}

/// Web scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Fixed delay before each page request, in seconds.
    pub delay_between_requests_sec: f64,
    /// Upper bound of the random delay added on top, in seconds.
    pub random_delay_sec: f64,
    /// Request timeout in seconds.
    pub timeout_sec: u64,
    /// Enable scraper debug logging.
    pub debug: bool,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            delay_between_requests_sec: 1.0,
            random_delay_sec: 1.0,
            timeout_sec: 30,
            debug: false,
        }
    }
}

/// Output note configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteConfig {
    /// Extension appended to note file names.
    pub extension: String,

    /// Root of the library folder tree referenced from notes.
    pub library_root: String,

    /// Directory the note is written to.
    pub output_directory: PathBuf,
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            extension: ".md".to_string(),
            library_root: "/Lib".to_string(),
            output_directory: PathBuf::from("."),
        }
    }
}

/// File path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Translation cache file. Defaults to the config directory.
    pub translations_file: Option<PathBuf>,
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from `path`, creating a default file there if
    /// none exists.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.search.is_configured() {
            return Err(ConfigError::MissingValue(
                "search.api_key (set your search API key in config file)".to_string(),
            ));
        }

        if self.search.engine_id.trim().is_empty() {
            return Err(ConfigError::MissingValue(
                "search.engine_id (set your search engine id in config file)".to_string(),
            ));
        }

        if !(1..=MAX_RESULTS_PER_SITE).contains(&self.search.results_per_site) {
            return Err(ConfigError::InvalidValue {
                key: "search.results_per_site".to_string(),
                message: format!("must be between 1 and {}", MAX_RESULTS_PER_SITE),
            });
        }

        for (key, value) in [
            ("search.site_switch_delay_sec", self.search.site_switch_delay_sec),
            (
                "scraping.delay_between_requests_sec",
                self.scraping.delay_between_requests_sec,
            ),
            ("scraping.random_delay_sec", self.scraping.random_delay_sec),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be a finite number of seconds, 0 or more".to_string(),
                });
            }
        }

        if self.search.default_order.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "search.default_order".to_string(),
                message: "must name at least one site".to_string(),
            });
        }

        if self.translation.provider == TranslationBackend::Api
            && !self.translation.api.is_configured()
        {
            return Err(ConfigError::MissingValue(
                "translation.api.key (required when translation.provider = \"api\")".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the effective translation cache path, using config or default.
    pub fn translations_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.translations_file {
            Ok(path.clone())
        } else {
            Ok(Self::config_dir()?.join(TRANSLATIONS_FILENAME))
        }
    }
}
