//! Livelib (www.livelib.ru) extractor.

use super::{Extraction, SiteExtractor, element_text, first_text};
use crate::book::{SiteId, merge_field};
use crate::person::Person;
use crate::utils::{find_year, percent_decode};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Ranking prefix on genre links: "№12 в Фэнтези".
static RANK_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"№\d* в (.*)").unwrap());

/// ISBN line in the edition block.
static ISBN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ISBN: (.*)").unwrap());

/// CSS selectors used for parsing.
struct Selectors {
    title: Selector,
    author: Selector,
    cover: Selector,
    publisher: Selector,
    /// Genre chips at the top of the page.
    genre_block: Selector,
    /// Edition info paragraphs ("Жанры:", "ISBN:", "Год издания:").
    info_wrapper: Selector,
    info: Selector,
    link: Selector,
    summary: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            title: Selector::parse("h1").unwrap(),
            author: Selector::parse("h2.bc-author a[href].bc-author__link").unwrap(),
            cover: Selector::parse("#main-image-book").unwrap(),
            publisher: Selector::parse("a.bc-edition__link").unwrap(),
            genre_block: Selector::parse(".bc-genre").unwrap(),
            info_wrapper: Selector::parse(".bc-info__wrapper div p").unwrap(),
            info: Selector::parse(".bc-info div p").unwrap(),
            link: Selector::parse("a[href]").unwrap(),
            summary: Selector::parse("div#lenta-card__text-edition-full").unwrap(),
        }
    }
}

/// Livelib extractor for www.livelib.ru/book pages.
///
/// Livelib writes author names "First Last".
pub struct LivelibExtractor {
    selectors: Selectors,
}

impl Default for LivelibExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LivelibExtractor {
    /// Creates a new Livelib extractor.
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }
}

/// Strips a "№N в " ranking prefix from a genre label.
fn remove_rank_prefix(text: &str) -> String {
    RANK_PREFIX_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| text.trim().to_string())
}

impl SiteExtractor for LivelibExtractor {
    fn site(&self) -> SiteId {
        SiteId::Livelib
    }

    fn name(&self) -> &'static str {
        "Livelib"
    }

    fn domain(&self) -> &'static str {
        "www.livelib.ru"
    }

    fn search_filters(&self) -> &'static [&'static str] {
        &["livelib.ru/book"]
    }

    fn extract(&self, url: &str, body: &str) -> Extraction {
        let doc = Html::parse_document(body);
        let s = &self.selectors;
        let mut extraction = Extraction::new(self.site(), url);

        merge_field(&mut extraction.book.name, &first_text(&doc, &s.title));

        extraction.book.authors.extend(
            doc.select(&s.author)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .map(|t| Person::parse(&t, true)),
        );

        if let Some(src) = doc.select(&s.cover).find_map(|img| img.value().attr("src")) {
            merge_field(&mut extraction.book.poster_url, &percent_decode(src));
        }
        merge_field(&mut extraction.book.publisher, &first_text(&doc, &s.publisher));

        for block in doc.select(&s.genre_block) {
            for link in block.select(&s.link) {
                extraction.genres.push(remove_rank_prefix(&element_text(link)));
            }
        }
        for paragraph in doc.select(&s.info_wrapper) {
            if element_text(paragraph).contains("Жанры:") {
                for link in paragraph.select(&s.link) {
                    extraction.genres.push(remove_rank_prefix(&element_text(link)));
                }
            }
        }

        for paragraph in doc.select(&s.info) {
            // Raw text keeps line breaks so the ISBN capture stops at the line end.
            let raw: String = paragraph.text().collect();
            if raw.contains("ISBN:")
                && let Some(caps) = ISBN_REGEX.captures(&raw)
            {
                merge_field(&mut extraction.book.isbn, &caps[1]);
            }
            if raw.contains("Год издания:") {
                merge_field(&mut extraction.book.year, &find_year(&raw));
            }
        }

        merge_field(&mut extraction.book.summary, &first_text(&doc, &s.summary));

        extraction
    }
}
