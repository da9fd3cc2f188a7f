//! Ozon (www.ozon.ru) extractor.
//!
//! Ozon renders product pages client-side, but every product page carries a
//! schema.org `Product` (or `Book`) object in a JSON-LD script. That object
//! is the only source read here.

use super::{Extraction, SiteExtractor};
use crate::book::{SiteId, merge_field};
use crate::person::Person;
use crate::utils::find_year;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

static JSON_LD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Ozon extractor for www.ozon.ru/product pages.
#[derive(Default)]
pub struct OzonExtractor;

impl OzonExtractor {
    /// Creates a new Ozon extractor.
    pub fn new() -> Self {
        Self
    }
}

/// Finds the first `Product`/`Book` object among the page's JSON-LD scripts.
fn find_product(doc: &Html) -> Option<Value> {
    doc.select(&JSON_LD_SELECTOR)
        .filter_map(|script| {
            let raw: String = script.text().collect();
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed JSON-LD");
                    None
                }
            }
        })
        .find_map(product_in)
}

fn product_in(value: Value) -> Option<Value> {
    match value {
        Value::Array(items) => items.into_iter().find_map(product_in),
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                return product_in(graph);
            }
            let is_product = match map.get("@type") {
                Some(Value::String(t)) => is_product_type(t),
                Some(Value::Array(types)) => types
                    .iter()
                    .filter_map(Value::as_str)
                    .any(is_product_type),
                _ => false,
            };
            is_product.then_some(Value::Object(map))
        }
        _ => None,
    }
}

fn is_product_type(t: &str) -> bool {
    matches!(t, "Product" | "Book")
}

/// A string field, or the first string of an array field.
fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string(),
        Some(Value::Object(map)) => text_of(map.get("name")),
        _ => String::new(),
    }
}

/// Author names from a string, a `Person` object, or an array of either.
fn author_names(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::Object(map)) => author_names(map.get("name")),
        Some(Value::Array(items)) => items.iter().flat_map(|v| author_names(Some(v))).collect(),
        _ => Vec::new(),
    }
}

impl SiteExtractor for OzonExtractor {
    fn site(&self) -> SiteId {
        SiteId::Ozon
    }

    fn name(&self) -> &'static str {
        "Ozon"
    }

    fn domain(&self) -> &'static str {
        "www.ozon.ru"
    }

    fn search_filters(&self) -> &'static [&'static str] {
        &["ozon.ru/product"]
    }

    /// Drops tracking parameters from product links.
    fn canonical_url(&self, url: &str) -> String {
        url.split(['?', '#']).next().unwrap_or(url).to_string()
    }

    fn extract(&self, url: &str, body: &str) -> Extraction {
        let doc = Html::parse_document(body);
        let mut extraction = Extraction::new(self.site(), url);

        let Some(product) = find_product(&doc) else {
            tracing::debug!(url, "no product JSON-LD on page");
            return extraction;
        };

        let book = &mut extraction.book;
        merge_field(&mut book.name, &text_of(product.get("name")));
        merge_field(&mut book.poster_url, &text_of(product.get("image")));
        merge_field(&mut book.summary, &text_of(product.get("description")));
        merge_field(&mut book.isbn, &text_of(product.get("isbn")));
        merge_field(&mut book.publisher, &text_of(product.get("publisher")));
        merge_field(&mut book.publisher, &text_of(product.get("brand")));
        merge_field(&mut book.year, &find_year(&text_of(product.get("datePublished"))));

        book.authors.extend(
            author_names(product.get("author"))
                .iter()
                .map(|name| Person::parse(name, false)),
        );

        match product.get("genre") {
            Some(Value::Array(items)) => extraction
                .genres
                .extend(items.iter().filter_map(Value::as_str).map(String::from)),
            other => {
                let genre = text_of(other);
                if !genre.is_empty() {
                    extraction.genres.push(genre);
                }
            }
        }

        extraction
    }
}
