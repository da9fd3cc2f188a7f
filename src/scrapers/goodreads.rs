//! Goodreads (www.goodreads.com) extractor.
//!
//! Goodreads is English-language: names are "First Last" and genres are
//! stored with an empty translation instead of going through the
//! translation cache. Both the current React layout and the legacy
//! layout are understood.

use super::{Extraction, SiteExtractor, element_text, first_text};
use crate::book::{SiteId, format_isbn13, merge_field};
use crate::person::Person;
use crate::utils::{find_year, percent_decode};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Publisher in "Published March 3rd 1998 by Ace Books".
static PUBLISHER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".* by (.*)").unwrap());

/// CSS selectors used for parsing.
struct Selectors {
    title: Selector,
    contributor: Selector,
    contributor_name: Selector,
    /// Primary cover selector (legacy layout).
    cover_primary: Selector,
    /// Fallback cover selector (current layout).
    cover_fallback: Selector,
    edition: Selector,
    /// Primary description selector (legacy layout).
    summary_primary: Selector,
    /// Fallback description selector (current layout).
    summary_fallback: Selector,
    genre_legacy: Selector,
    genre_current: Selector,
    isbn: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            title: Selector::parse("div.BookPageTitleSection__title").unwrap(),
            contributor: Selector::parse("div.BookPageMetadataSection__contributor").unwrap(),
            contributor_name: Selector::parse(".ContributorLink__name").unwrap(),
            cover_primary: Selector::parse("img#coverImage").unwrap(),
            cover_fallback: Selector::parse(".BookCover__image img").unwrap(),
            edition: Selector::parse(".EditionDetails").unwrap(),
            summary_primary: Selector::parse("#description span:nth-child(1)").unwrap(),
            summary_fallback: Selector::parse(".BookPageMetadataSection__description .Formatted")
                .unwrap(),
            genre_legacy: Selector::parse(".elementList div.left a.actionLinkLite.bookPageGenreLink")
                .unwrap(),
            genre_current: Selector::parse(".BookPageMetadataSection__genreButton .Button__labelItem")
                .unwrap(),
            isbn: Selector::parse(r#"#bookDataBox div.clearFloats span[itemprop="isbn"]"#).unwrap(),
        }
    }
}

/// Goodreads extractor for www.goodreads.com/book pages.
pub struct GoodreadsExtractor {
    selectors: Selectors,
}

impl Default for GoodreadsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl GoodreadsExtractor {
    /// Creates a new Goodreads extractor.
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }
}

impl SiteExtractor for GoodreadsExtractor {
    fn site(&self) -> SiteId {
        SiteId::Goodreads
    }

    fn name(&self) -> &'static str {
        "Goodreads"
    }

    fn domain(&self) -> &'static str {
        "www.goodreads.com"
    }

    fn search_filters(&self) -> &'static [&'static str] {
        &["goodreads.com/book", "goodreads.com/en/book"]
    }

    fn extract(&self, url: &str, body: &str) -> Extraction {
        let doc = Html::parse_document(body);
        let s = &self.selectors;
        let mut extraction = Extraction::new(self.site(), url);
        let book = &mut extraction.book;

        merge_field(&mut book.name, &first_text(&doc, &s.title));

        for block in doc.select(&s.contributor) {
            book.authors.extend(
                block
                    .select(&s.contributor_name)
                    .map(element_text)
                    .filter(|t| !t.is_empty())
                    .map(|t| Person::parse(&t, true)),
            );
        }

        let cover = doc
            .select(&s.cover_primary)
            .chain(doc.select(&s.cover_fallback))
            .find_map(|img| img.value().attr("src"));
        if let Some(src) = cover {
            merge_field(&mut book.poster_url, &percent_decode(src));
        }

        for details in doc.select(&s.edition) {
            let text = element_text(details);
            if !text.contains("Published") {
                continue;
            }
            merge_field(&mut book.year, &find_year(&text));
            if let Some(caps) = PUBLISHER_REGEX.captures(&text) {
                merge_field(&mut book.publisher, &caps[1]);
            }
        }

        merge_field(&mut book.summary, &first_text(&doc, &s.summary_primary));
        merge_field(&mut book.summary, &first_text(&doc, &s.summary_fallback));

        for link in doc.select(&s.genre_legacy).chain(doc.select(&s.genre_current)) {
            let genre = element_text(link).to_lowercase();
            if !genre.is_empty() {
                book.genres.entry(genre).or_default();
            }
        }

        for span in doc.select(&s.isbn) {
            if let Some(isbn) = format_isbn13(&element_text(span)) {
                merge_field(&mut book.isbn, &isbn);
            }
        }

        extraction
    }
}
