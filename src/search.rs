//! Web search for candidate book pages.
//!
//! Candidates are found with a site-restricted web search. The default
//! provider is the Google Programmable Search JSON API: an exact-phrase
//! search first, then, if that finds nothing, a plain query after a short
//! pause.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::utils::check_response_status;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Pause before retrying a search without the exact-phrase restriction.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Finds result URLs for a query restricted to one site filter.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns up to `count` result links for `query` within `site_filter`.
    async fn search(
        &self,
        query: &str,
        site_filter: &str,
        count: u32,
    ) -> Result<Vec<String>, SearchError>;
}

/// Search response from the Custom Search JSON API.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

/// Which query parameter carries the user's text.
#[derive(Debug, Clone, Copy)]
enum QueryMode {
    /// `exactTerms`: every hit must contain the phrase.
    Exact,
    /// `q`: ordinary ranked search.
    Plain,
}

/// Google Programmable Search client.
pub struct GoogleSearch {
    client: Client,
    config: SearchConfig,
}

impl GoogleSearch {
    /// Create a new GoogleSearch.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Builds the request URL for one search call.
    fn request_url(
        &self,
        query: &str,
        site_filter: &str,
        count: u32,
        mode: QueryMode,
    ) -> Result<url::Url, SearchError> {
        let query_param = match mode {
            QueryMode::Exact => "exactTerms",
            QueryMode::Plain => "q",
        };
        let count = count.to_string();
        let url = url::Url::parse_with_params(
            &self.config.base_url,
            [
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.engine_id.as_str()),
                ("num", count.as_str()),
                ("siteSearch", site_filter),
                (query_param, query),
            ],
        )?;
        Ok(url)
    }

    async fn request(
        &self,
        query: &str,
        site_filter: &str,
        count: u32,
        mode: QueryMode,
    ) -> Result<Vec<String>, SearchError> {
        let url = self.request_url(query, site_filter, count, mode)?;
        tracing::debug!(site_filter, ?mode, "search request");

        let response = self.client.get(url).send().await?;
        let response = check_response_status(response)
            .await
            .map_err(SearchError::ApiError)?;

        let body: SearchResponse = response.json().await?;
        Ok(body.items.into_iter().map(|item| item.link).collect())
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(
        &self,
        query: &str,
        site_filter: &str,
        count: u32,
    ) -> Result<Vec<String>, SearchError> {
        let links = self
            .request(query, site_filter, count, QueryMode::Exact)
            .await?;
        if !links.is_empty() {
            return Ok(links);
        }

        tokio::time::sleep(RETRY_DELAY).await;
        self.request(query, site_filter, count, QueryMode::Plain)
            .await
    }
}
