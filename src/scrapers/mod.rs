//! Site extractors and page fetching.
//!
//! Each bookseller site has an extractor that turns one fetched page into a
//! partial [`Book`]. Extraction itself is synchronous and pure; fetching
//! goes through a [`PageFetcher`] and genre/tag labels are translated
//! afterwards by [`Extraction::resolve`].

mod goodreads;
mod labirint;
mod litres;
mod livelib;
mod ozon;

pub use goodreads::GoodreadsExtractor;
pub use labirint::LabirintExtractor;
pub use litres::LitresExtractor;
pub use livelib::LivelibExtractor;
pub use ozon::OzonExtractor;

use crate::book::{Book, SiteId};
use crate::config::ScrapingConfig;
use crate::error::{ScraperError, TranslationError};
use crate::translations::TranslationCache;
use crate::utils::{normalize_whitespace, percent_decode};
use async_trait::async_trait;
use rand::Rng;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

/// Selector for `<meta>` elements carrying OpenGraph properties.
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property]").unwrap());

/// Result of running an extractor over one page.
///
/// Genre and tag labels are kept raw until [`Extraction::resolve`]
/// translates them, so parsing never waits on the translation backend.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Partial record; links to the page it came from.
    pub book: Book,
    /// Raw genre labels awaiting translation.
    pub genres: Vec<String>,
    /// Raw tag labels awaiting translation.
    pub tags: Vec<String>,
}

impl Extraction {
    /// Starts an empty extraction for `url` on `site`.
    pub fn new(site: SiteId, url: &str) -> Self {
        Self {
            book: Book::from_site(site, url),
            genres: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Translates the collected labels into the book's genre/tag maps and
    /// drops persons that parsed to nothing.
    pub async fn resolve(self, cache: &mut TranslationCache) -> Result<Book, TranslationError> {
        let Extraction {
            mut book,
            genres,
            tags,
        } = self;

        // Bylines made only of particles or punctuation parse to nothing.
        for persons in [
            &mut book.authors,
            &mut book.painters,
            &mut book.editors,
            &mut book.translators,
        ] {
            persons.retain(|p| !p.is_empty());
        }

        for genre in &genres {
            cache.append_genre(&mut book, genre).await?;
        }
        for tag in &tags {
            cache.append_tag(&mut book, tag).await?;
        }
        Ok(book)
    }
}

/// Trait for site-specific metadata extractors.
///
/// Each extractor handles one bookseller domain and knows how that site
/// lays out titles, bylines, edition details and genre lists.
pub trait SiteExtractor: Send + Sync {
    /// Returns the source site this extractor reads.
    fn site(&self) -> SiteId;

    /// Returns the human-readable name of this extractor.
    fn name(&self) -> &'static str;

    /// The only host this extractor fetches from.
    fn domain(&self) -> &'static str;

    /// Site filters handed to the search provider, tried in order.
    fn search_filters(&self) -> &'static [&'static str];

    /// Maps a search hit to the page that should be fetched and linked.
    fn canonical_url(&self, url: &str) -> String {
        url.to_string()
    }

    /// Checks if this extractor may fetch the given URL.
    fn can_handle(&self, url: &str) -> bool {
        url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h == self.domain()))
            .unwrap_or(false)
    }

    /// Extracts a partial record from a fetched page body.
    fn extract(&self, url: &str, body: &str) -> Extraction;
}

/// Registry of available extractors.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn SiteExtractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorRegistry {
    /// Creates a new registry with all available extractors.
    pub fn new() -> Self {
        let extractors: Vec<Box<dyn SiteExtractor>> = vec![
            Box::new(LabirintExtractor::new()),
            Box::new(LivelibExtractor::new()),
            Box::new(GoodreadsExtractor::new()),
            Box::new(LitresExtractor::new()),
            Box::new(OzonExtractor::new()),
        ];

        Self { extractors }
    }

    /// Returns the extractor for `site`, if there is one.
    pub fn get(&self, site: SiteId) -> Option<&dyn SiteExtractor> {
        self.extractors
            .iter()
            .find(|e| e.site() == site)
            .map(|e| e.as_ref())
    }

    /// Finds the extractor whose domain hosts the given URL.
    pub fn find_for_url(&self, url: &str) -> Option<&dyn SiteExtractor> {
        self.extractors
            .iter()
            .find(|e| e.can_handle(url))
            .map(|e| e.as_ref())
    }
}

/// Source of page bodies.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError>;
}

/// Polite HTTP fetcher with a fixed plus random delay before each request.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: ScrapingConfig,
}

impl HttpFetcher {
    /// Creates a fetcher with the given configuration.
    pub fn new(config: ScrapingConfig) -> Result<Self, ScraperError> {
        let client = create_http_client(Duration::from_secs(config.timeout_sec))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        rate_limit(
            self.config.delay_between_requests_sec,
            self.config.random_delay_sec,
        )
        .await;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Common HTTP client configuration for fetchers.
pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .cookie_store(true)
        .timeout(timeout)
        .build()
}

/// Applies rate limiting delay: `delay_sec` plus up to `jitter_sec` at random.
pub async fn rate_limit(delay_sec: f64, jitter_sec: f64) {
    let delay = rate_limit_delay(delay_sec, jitter_sec);
    if !delay.is_zero() {
        tracing::debug!(?delay, "rate limit");
        tokio::time::sleep(delay).await;
    }
}

fn rate_limit_delay(delay_sec: f64, jitter_sec: f64) -> Duration {
    let base = delay_sec.max(0.0);
    let jitter = if jitter_sec > 0.0 {
        rand::rng().random_range(0.0..jitter_sec)
    } else {
        0.0
    };
    Duration::from_secs_f64(base + jitter)
}

/// Text of an element with whitespace collapsed.
fn element_text(elem: ElementRef) -> String {
    normalize_whitespace(&elem.text().collect::<String>())
}

/// Text of the first element matching `selector` that has any text.
fn first_text(doc: &Html, selector: &Selector) -> String {
    doc.select(selector)
        .map(element_text)
        .find(|t| !t.is_empty())
        .unwrap_or_default()
}

/// Content of `<meta property="...">`, percent-decoded.
fn meta_property(doc: &Html, property: &str) -> String {
    doc.select(&META_SELECTOR)
        .find(|m| m.value().attr("property") == Some(property))
        .and_then(|m| m.value().attr("content"))
        .map(percent_decode)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = ExtractorRegistry::new();
        for site in [
            SiteId::Labirint,
            SiteId::Livelib,
            SiteId::Goodreads,
            SiteId::Litres,
            SiteId::Ozon,
        ] {
            assert_eq!(registry.get(site).map(|e| e.site()), Some(site));
        }
        assert!(registry.get(SiteId::Flibusta).is_none());
    }

    #[test]
    fn test_find_for_url_checks_domain() {
        let registry = ExtractorRegistry::new();
        let found = registry.find_for_url("https://www.labirint.ru/books/123456/");
        assert_eq!(found.map(|e| e.name()), Some("Labirint"));
        let found = registry.find_for_url("https://www.ozon.ru/product/dyuna-1/");
        assert_eq!(found.map(|e| e.site()), Some(SiteId::Ozon));
        assert!(registry.find_for_url("https://labirint.ru.evil.example/books/1").is_none());
        assert!(registry.find_for_url("not a url").is_none());
    }

    #[test]
    fn test_rate_limit_delay_bounds() {
        for _ in 0..50 {
            let d = rate_limit_delay(1.0, 1.0);
            assert!(d >= Duration::from_secs(1));
            assert!(d < Duration::from_secs(2));
        }
        assert!(rate_limit_delay(0.0, 0.0).is_zero());
        assert!(rate_limit_delay(-1.0, 0.0).is_zero());
    }

    #[tokio::test]
    async fn test_resolve_translates_and_drops_empty_persons() {
        use crate::testing::EchoTranslator;
        use crate::person::Person;

        let dir = tempfile::TempDir::new().unwrap();
        let mut cache =
            TranslationCache::load(dir.path().join("t.json"), Box::new(EchoTranslator)).unwrap();
        let mut extraction = Extraction::new(SiteId::Litres, "https://www.litres.ru/book/1/");
        extraction.book.authors = vec![Person::parse("де", false), Person::parse("Пелевин", false)];
        extraction.genres.push("Фэнтези".to_string());
        extraction.tags.push("сатира".to_string());

        let book = extraction.resolve(&mut cache).await.unwrap();

        assert_eq!(book.authors.len(), 1);
        assert_eq!(book.authors[0].last_name, "Пелевин");
        assert_eq!(book.genres["фэнтези"], "фэнтези-en");
        assert_eq!(book.tags["сатира"], "сатира-en");
    }

    #[test]
    fn test_meta_property_decodes() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:image" content="https://img.example.com/c%20v.jpg"></head></html>"#,
        );
        assert_eq!(meta_property(&doc, "og:image"), "https://img.example.com/c v.jpg");
        assert_eq!(meta_property(&doc, "og:title"), "");
    }
}
