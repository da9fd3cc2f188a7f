//! In-memory collaborators for tests.

use crate::error::{ScraperError, SearchError, TranslationError};
use crate::scrapers::PageFetcher;
use crate::search::SearchProvider;
use crate::translator::TranslationProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Answers searches from a table keyed by site filter and records calls.
#[derive(Default)]
pub struct StubSearch {
    pub results: HashMap<&'static str, Vec<&'static str>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl StubSearch {
    pub fn new(results: Vec<(&'static str, Vec<&'static str>)>) -> Self {
        Self {
            results: results.into_iter().collect(),
            calls: Arc::default(),
        }
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(
        &self,
        _query: &str,
        site_filter: &str,
        count: u32,
    ) -> Result<Vec<String>, SearchError> {
        self.calls.lock().unwrap().push(site_filter.to_string());
        Ok(self
            .results
            .get(site_filter)
            .map(|links| {
                links
                    .iter()
                    .take(count as usize)
                    .map(|l| l.to_string())
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Every search fails as if the API rejected the request.
pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(
        &self,
        _query: &str,
        _site_filter: &str,
        _count: u32,
    ) -> Result<Vec<String>, SearchError> {
        Err(SearchError::ApiError("quota exceeded".to_string()))
    }
}

/// Serves fixed bodies; unknown URLs fail like a 404.
pub struct StubFetcher {
    pub pages: HashMap<&'static str, &'static str>,
}

impl StubFetcher {
    pub fn new(pages: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        self.pages
            .get(url)
            .map(|body| body.to_string())
            .ok_or_else(|| ScraperError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// Appends `-en` to every label.
pub struct EchoTranslator;

#[async_trait]
impl TranslationProvider for EchoTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        Ok(format!("{}-en", text))
    }
}

/// Every translation fails.
pub struct FailingTranslator;

#[async_trait]
impl TranslationProvider for FailingTranslator {
    async fn translate(&self, _text: &str) -> Result<String, TranslationError> {
        Err(TranslationError::ApiError("offline".to_string()))
    }
}

pub const LABIRINT_URL: &str = "https://www.labirint.ru/books/1/";
pub const LABIRINT_PAGE: &str = r#"<div class="authors">Автор: <a href="/a/">Стругацкий Аркадий</a></div>
<div class="publisher">Издательство: <a href="/p/">АСТ</a>, 2019 г.</div>
<div id="product-about"><h2>Аннотация к книге "Пикник на обочине"</h2><p>Повесть о Зоне.</p></div>"#;

pub const LITRES_URL: &str = "https://www.litres.ru/book/piknik-1/";
pub const LITRES_PAGE: &str = r#"<div class="biblio_book_info"><ul><li><strong>Жанр:</strong> <a href="/g/">фантастика</a></li></ul></div>
<span itemprop="isbn">978-5-17-090334-4</span>"#;
