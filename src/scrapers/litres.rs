//! Litres (www.litres.ru) extractor.
//!
//! Litres pages are only partly server-rendered: the genre and tag list
//! sits in a `biblio_book_info` block, while the author and ISBN appear in
//! inline markup and scripts. Those are matched on the raw body.

use super::{Extraction, SiteExtractor, element_text, meta_property};
use crate::book::{SiteId, merge_field};
use crate::person::Person;
use crate::utils::normalize_whitespace;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static INFO_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div class="biblio_book_info">(.*?)</div>"#).unwrap());

/// Author name in the inline analytics script.
static AUTHOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"author: "(.*?)","#).unwrap());

static SUMMARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div itemprop="description" class="biblio_book_descr_publishers">(.*?)</div>"#)
        .unwrap()
});

static ISBN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span itemprop="isbn">(.*?)</span>"#).unwrap());

static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<h1 itemprop="name">(.*?)</h1>"#).unwrap());

/// CSS selectors used inside the info block.
struct Selectors {
    item: Selector,
    label: Selector,
    link: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            item: Selector::parse("li").unwrap(),
            label: Selector::parse("strong").unwrap(),
            link: Selector::parse("a").unwrap(),
        }
    }
}

/// Litres extractor for www.litres.ru book pages.
pub struct LitresExtractor {
    selectors: Selectors,
}

impl Default for LitresExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LitresExtractor {
    /// Creates a new Litres extractor.
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }

    /// Collects "Жанр:" and "Теги:" links from the info block.
    fn parse_info_block(&self, block: &str, extraction: &mut Extraction) {
        let fragment = Html::parse_fragment(block);
        let s = &self.selectors;

        for item in fragment.select(&s.item) {
            let label: String = item.select(&s.label).map(element_text).collect();
            let target = match label.as_str() {
                "Жанр:" => &mut extraction.genres,
                "Теги:" => &mut extraction.tags,
                _ => continue,
            };
            for link in item.select(&s.link) {
                let href = link.value().attr("href").unwrap_or("");
                if !href.is_empty() && href != "#" {
                    target.push(element_text(link));
                }
            }
        }
    }
}

/// Visible text of an HTML snippet.
fn strip_tags(snippet: &str) -> String {
    let fragment = Html::parse_fragment(snippet);
    normalize_whitespace(&fragment.root_element().text().collect::<String>())
}

impl SiteExtractor for LitresExtractor {
    fn site(&self) -> SiteId {
        SiteId::Litres
    }

    fn name(&self) -> &'static str {
        "Litres"
    }

    fn domain(&self) -> &'static str {
        "www.litres.ru"
    }

    fn search_filters(&self) -> &'static [&'static str] {
        &["litres.ru"]
    }

    /// Search hits often point at the online reader; the book page is the
    /// path before `chitat-onlayn`.
    fn canonical_url(&self, url: &str) -> String {
        match url.rfind("chitat-onlayn") {
            Some(pos) if pos > 0 => url[..pos].to_string(),
            _ => url.to_string(),
        }
    }

    fn extract(&self, url: &str, body: &str) -> Extraction {
        let mut extraction = Extraction::new(self.site(), url);

        if let Some(caps) = INFO_BLOCK_REGEX.captures(body) {
            self.parse_info_block(caps[1].trim(), &mut extraction);
        }

        let book = &mut extraction.book;
        if book.authors.is_empty()
            && let Some(caps) = AUTHOR_REGEX.captures(body)
        {
            let name = caps[1].trim();
            if !name.is_empty() {
                book.authors.push(Person::parse(name, false));
            }
        }
        if let Some(caps) = SUMMARY_REGEX.captures(body) {
            merge_field(&mut book.summary, &strip_tags(&caps[1]));
        }
        if let Some(caps) = ISBN_REGEX.captures(body) {
            merge_field(&mut book.isbn, &caps[1]);
        }
        if let Some(caps) = TITLE_REGEX.captures(body) {
            merge_field(&mut book.name, &strip_tags(&caps[1]));
        }

        let doc = Html::parse_document(body);
        merge_field(&mut book.poster_url, &meta_property(&doc, "og:image"));

        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html><head>
<meta property="og:image" content="https://cv.litres.ru/pub/c/cover/123.jpg">
</head><body>
<script>dataLayer.push({ author: "Пелевин Виктор", id: 123 });</script>
<h1 itemprop="name">Generation «П»</h1>
<div class="biblio_book_info"><ul>
  <li><strong>Жанр:</strong> <a href="/genre/sovremennaya-proza/">современная проза</a>, <a href="#">ещё</a></li>
  <li><strong>Теги:</strong> <a href="/tags/satira/">сатира</a>, <a href="">пусто</a></li>
  <li><strong>Возрастное ограничение:</strong> <a href="/age/">18+</a></li>
</ul></div>
<div itemprop="description" class="biblio_book_descr_publishers"><p>Роман о <b>поколении</b>.</p></div>
<span itemprop="isbn">978-5-04-089451-3</span>
</body></html>"##;

    const URL: &str = "https://www.litres.ru/viktor-pelevin/generation-p-123/";

    #[test]
    fn test_extract_full_page() {
        let extraction = LitresExtractor::new().extract(URL, PAGE);
        let book = &extraction.book;

        assert_eq!(extraction.genres, vec!["современная проза"]);
        assert_eq!(extraction.tags, vec!["сатира"]);
        assert_eq!(book.authors.len(), 1);
        assert_eq!(book.authors[0].last_name, "Пелевин");
        assert_eq!(book.authors[0].first_name, "Виктор");
        assert_eq!(book.summary, "Роман о поколении.");
        assert_eq!(book.isbn, "978-5-04-089451-3");
        assert_eq!(book.name, "Generation «П»");
        assert_eq!(book.poster_url, "https://cv.litres.ru/pub/c/cover/123.jpg");
        assert_eq!(book.urls[&SiteId::Litres], URL);
    }

    #[test]
    fn test_extract_without_info_block() {
        let extraction =
            LitresExtractor::new().extract(URL, "<html><body><p>nothing</p></body></html>");
        assert!(extraction.genres.is_empty());
        assert!(extraction.tags.is_empty());
        assert!(extraction.book.authors.is_empty());
    }

    #[test]
    fn test_canonical_url_drops_reader_suffix() {
        let extractor = LitresExtractor::new();
        assert_eq!(
            extractor.canonical_url("https://www.litres.ru/book/generation-p-123/chitat-onlayn/"),
            "https://www.litres.ru/book/generation-p-123/"
        );
        assert_eq!(extractor.canonical_url(URL), URL);
    }
}
