//! Collecting candidate records for a query.
//!
//! Sites are tried one at a time in priority order. The first site whose
//! search produces at least one candidate supplies the whole list; records
//! from different sites are never mixed into one list. After a candidate is
//! chosen it can be topped up from the supplement sites.

use crate::book::{Book, SiteId};
use crate::config::SearchConfig;
use crate::error::{FinderError, ScraperError, SearchError, TranslationError};
use crate::scrapers::{Extraction, ExtractorRegistry, PageFetcher, SiteExtractor};
use crate::search::SearchProvider;
use crate::translations::TranslationCache;
use crate::utils::is_latin;
use std::time::Duration;

/// Finds and enriches candidate records.
pub struct BookFinder {
    registry: ExtractorRegistry,
    search: Box<dyn SearchProvider>,
    fetcher: Box<dyn PageFetcher>,
    config: SearchConfig,
}

impl BookFinder {
    /// Create a new BookFinder.
    pub fn new(
        config: SearchConfig,
        search: Box<dyn SearchProvider>,
        fetcher: Box<dyn PageFetcher>,
    ) -> Self {
        Self {
            registry: ExtractorRegistry::new(),
            search,
            fetcher,
            config,
        }
    }

    /// Site priority for a query: the Latin order when the query starts
    /// with a Latin letter, the default order otherwise.
    pub fn site_order(&self, query: &str) -> &[SiteId] {
        if is_latin(query) {
            &self.config.latin_order
        } else {
            &self.config.default_order
        }
    }

    /// Returns the candidates from the first site that yields any.
    ///
    /// An empty list means no site produced a candidate.
    pub async fn candidates(
        &self,
        query: &str,
        cache: &mut TranslationCache,
    ) -> Result<Vec<Book>, FinderError> {
        for (i, &site) in self.site_order(query).iter().enumerate() {
            let Some(extractor) = self.registry.get(site) else {
                tracing::warn!(%site, "no extractor for site, skipping");
                continue;
            };

            if i > 0 && self.config.site_switch_delay_sec > 0.0 {
                tokio::time::sleep(Duration::from_secs_f64(self.config.site_switch_delay_sec))
                    .await;
            }

            let urls = self
                .search_site(extractor, query, self.config.results_per_site)
                .await?;
            tracing::info!(site = extractor.name(), results = urls.len(), "searched");

            let mut books = Vec::with_capacity(urls.len());
            for url in urls {
                if let Some(book) = self.visit(extractor, &url, cache).await? {
                    books.push(book);
                }
            }

            if !books.is_empty() {
                return Ok(books);
            }
        }

        Ok(Vec::new())
    }

    /// Fills fields the chosen record lacks from the supplement sites.
    ///
    /// Each supplement site contributes its top search hit; sites the
    /// record already links to are skipped. Nothing already set is
    /// overwritten.
    pub async fn enrich(
        &self,
        book: &mut Book,
        query: &str,
        cache: &mut TranslationCache,
    ) -> Result<(), FinderError> {
        for &site in &self.config.supplement {
            if book.urls.contains_key(&site) {
                continue;
            }
            let Some(extractor) = self.registry.get(site) else {
                tracing::warn!(%site, "no extractor for supplement site, skipping");
                continue;
            };

            let urls = self.search_site(extractor, query, 1).await?;
            let Some(url) = urls.first() else {
                tracing::info!(site = extractor.name(), "nothing to supplement from");
                continue;
            };
            if let Some(extra) = self.visit(extractor, url, cache).await? {
                book.merge(extra);
            }
        }
        Ok(())
    }

    /// Runs every search filter of a site and collects distinct links.
    async fn search_site(
        &self,
        extractor: &dyn SiteExtractor,
        query: &str,
        count: u32,
    ) -> Result<Vec<String>, SearchError> {
        let mut urls: Vec<String> = Vec::new();
        for filter in extractor.search_filters() {
            for url in self.search.search(query, filter, count).await? {
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }
        Ok(urls)
    }

    /// Fetches one search hit and turns it into a record.
    ///
    /// Links that do not belong to the extractor's site are dropped. A
    /// failed fetch is logged and yields a record holding only the link.
    async fn visit(
        &self,
        extractor: &dyn SiteExtractor,
        url: &str,
        cache: &mut TranslationCache,
    ) -> Result<Option<Book>, TranslationError> {
        let url = extractor.canonical_url(url);
        let owner = self.registry.find_for_url(&url).map(|e| e.site());
        if owner != Some(extractor.site()) {
            let err = ScraperError::DomainNotAllowed {
                site: extractor.name(),
                url,
            };
            tracing::warn!(error = %err, "skipping search hit");
            return Ok(None);
        }

        tracing::info!(site = extractor.name(), url = %url, "visiting");
        let extraction = match self.fetcher.fetch(&url).await {
            Ok(body) => extractor.extract(&url, &body),
            Err(e) => {
                tracing::warn!(site = extractor.name(), url = %url, error = %e, "fetch failed");
                Extraction::new(extractor.site(), &url)
            }
        };

        extraction.resolve(cache).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        EchoTranslator, FailingSearch, FailingTranslator, LABIRINT_PAGE, LABIRINT_URL,
        LITRES_PAGE, LITRES_URL, StubFetcher, StubSearch,
    };
    use tempfile::TempDir;

    fn finder(search: StubSearch, pages: Vec<(&'static str, &'static str)>) -> BookFinder {
        let config = SearchConfig {
            site_switch_delay_sec: 0.0,
            ..SearchConfig::default()
        };
        BookFinder::new(config, Box::new(search), Box::new(StubFetcher::new(pages)))
    }

    fn cache(dir: &TempDir) -> TranslationCache {
        TranslationCache::load(dir.path().join("t.json"), Box::new(EchoTranslator)).unwrap()
    }

    #[test]
    fn test_site_order_by_script() {
        let finder = finder(StubSearch::default(), vec![]);
        assert_eq!(finder.site_order("Dune")[0], SiteId::Goodreads);
        assert_eq!(finder.site_order("Дюна")[0], SiteId::Labirint);
        assert_eq!(finder.site_order("1984")[0], SiteId::Labirint);
    }

    #[tokio::test]
    async fn test_first_site_with_results_wins() {
        let search = StubSearch::new(vec![
            ("livelib.ru/book", vec!["https://www.livelib.ru/book/1"]),
            ("litres.ru", vec![LITRES_URL]),
        ]);
        let calls = search.calls.clone();
        let finder = finder(search, vec![(LITRES_URL, LITRES_PAGE)]);
        let dir = TempDir::new().unwrap();

        let books = finder.candidates("Пикник", &mut cache(&dir)).await.unwrap();

        assert_eq!(books.len(), 1);
        assert!(books[0].urls.contains_key(&SiteId::Livelib));
        // The Livelib fetch failed, so the record keeps only its link.
        assert!(books[0].name.is_empty());
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["labirint.ru/books", "livelib.ru/book"]
        );
    }

    #[tokio::test]
    async fn test_candidates_extract_and_translate() {
        let search = StubSearch::new(vec![("litres.ru", vec![LITRES_URL])]);
        let finder = finder(search, vec![(LITRES_URL, LITRES_PAGE)]);
        let dir = TempDir::new().unwrap();

        let books = finder.candidates("Пикник", &mut cache(&dir)).await.unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].isbn, "978-5-17-090334-4");
        assert_eq!(books[0].genres["фантастика"], "фантастика-en");
    }

    #[tokio::test]
    async fn test_goodreads_searches_both_filters() {
        let search = StubSearch::new(vec![
            ("goodreads.com/book", vec!["https://www.goodreads.com/book/show/1"]),
            (
                "goodreads.com/en/book",
                vec![
                    "https://www.goodreads.com/book/show/1",
                    "https://www.goodreads.com/en/book/show/2",
                ],
            ),
        ]);
        let finder = finder(search, vec![]);
        let dir = TempDir::new().unwrap();

        let books = finder.candidates("Dune", &mut cache(&dir)).await.unwrap();
        assert_eq!(books.len(), 2);
        assert!(books.iter().all(|b| b.urls.contains_key(&SiteId::Goodreads)));
    }

    #[tokio::test]
    async fn test_foreign_domain_hit_is_skipped() {
        let search = StubSearch::new(vec![(
            "labirint.ru/books",
            vec!["https://labirint.ru.example.com/books/1/"],
        )]);
        let finder = finder(search, vec![]);
        let dir = TempDir::new().unwrap();

        let books = finder.candidates("Пикник", &mut cache(&dir)).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_hit_from_another_site_is_skipped() {
        let search = StubSearch::new(vec![("labirint.ru/books", vec![LITRES_URL])]);
        let finder = finder(search, vec![(LITRES_URL, LITRES_PAGE)]);
        let dir = TempDir::new().unwrap();

        let books = finder.candidates("Пикник", &mut cache(&dir)).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_aborts() {
        let config = SearchConfig {
            site_switch_delay_sec: 0.0,
            ..SearchConfig::default()
        };
        let finder = BookFinder::new(
            config,
            Box::new(FailingSearch),
            Box::new(StubFetcher::new(vec![])),
        );
        let dir = TempDir::new().unwrap();

        let result = finder.candidates("Пикник", &mut cache(&dir)).await;
        assert!(matches!(result, Err(FinderError::Search(_))));
    }

    #[tokio::test]
    async fn test_translation_failure_aborts() {
        let search = StubSearch::new(vec![("litres.ru", vec![LITRES_URL])]);
        let finder = finder(search, vec![(LITRES_URL, LITRES_PAGE)]);
        let dir = TempDir::new().unwrap();
        let mut cache =
            TranslationCache::load(dir.path().join("t.json"), Box::new(FailingTranslator))
                .unwrap();

        let result = finder.candidates("Пикник", &mut cache).await;
        assert!(matches!(result, Err(FinderError::Translation(_))));
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let finder = finder(StubSearch::default(), vec![]);
        let dir = TempDir::new().unwrap();
        let books = finder.candidates("Пикник", &mut cache(&dir)).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_enrich_fills_missing_fields_only() {
        let search = StubSearch::new(vec![
            ("labirint.ru/books", vec![LABIRINT_URL]),
            ("litres.ru", vec![LITRES_URL]),
        ]);
        let finder = finder(
            search,
            vec![(LABIRINT_URL, LABIRINT_PAGE), (LITRES_URL, LITRES_PAGE)],
        );
        let dir = TempDir::new().unwrap();
        let mut cache = cache(&dir);

        let mut books = finder.candidates("Пикник", &mut cache).await.unwrap();
        let mut book = books.remove(0);
        book.isbn = "keep-me".to_string();
        finder.enrich(&mut book, "Пикник", &mut cache).await.unwrap();

        assert_eq!(book.name, "Пикник на обочине");
        assert_eq!(book.isbn, "keep-me");
        assert!(book.genres.contains_key("фантастика"));
        assert_eq!(book.urls.len(), 2);
        assert_eq!(book.urls[&SiteId::Litres], LITRES_URL);
    }

    #[tokio::test]
    async fn test_enrich_skips_linked_site() {
        let search = StubSearch::new(vec![("litres.ru", vec![LITRES_URL])]);
        let calls = search.calls.clone();
        let finder = finder(search, vec![(LITRES_URL, LITRES_PAGE)]);
        let dir = TempDir::new().unwrap();

        let mut book = Book::from_site(SiteId::Litres, LITRES_URL);
        finder.enrich(&mut book, "Пикник", &mut cache(&dir)).await.unwrap();
        assert!(calls.lock().unwrap().is_empty());
    }
}
