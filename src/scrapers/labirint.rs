//! Labirint (www.labirint.ru) extractor.
//!
//! Labirint bylines are written "Last First", so names are parsed with the
//! invert hint off.

use super::{Extraction, SiteExtractor, element_text, first_text, meta_property};
use crate::book::{SiteId, merge_field};
use crate::person::Person;
use crate::utils::find_year;
use scraper::{Html, Selector};

/// Person roles listed in `.authors` blocks, by their label.
const ROLE_LABELS: [(&str, Role); 4] = [
    ("Автор:", Role::Author),
    ("Художник:", Role::Painter),
    ("Редактор:", Role::Editor),
    ("Переводчик:", Role::Translator),
];

#[derive(Debug, Clone, Copy)]
enum Role {
    Author,
    Painter,
    Editor,
    Translator,
}

/// CSS selectors used for parsing.
struct Selectors {
    /// Annotation heading holding the title.
    title: Selector,
    /// Annotation paragraphs.
    summary: Selector,
    /// Person blocks ("Автор: ...", "Переводчик: ...").
    persons: Selector,
    /// Links inside a block.
    link: Selector,
    /// Publisher link.
    publisher_link: Selector,
    /// Publisher block with the year.
    publisher: Selector,
    /// Series link.
    series: Selector,
    /// ISBN line.
    isbn: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            title: Selector::parse("#product-about h2").unwrap(),
            summary: Selector::parse("#product-about p").unwrap(),
            persons: Selector::parse(".authors").unwrap(),
            link: Selector::parse("a[href]").unwrap(),
            publisher_link: Selector::parse(".publisher a").unwrap(),
            publisher: Selector::parse(".publisher").unwrap(),
            series: Selector::parse(".series a").unwrap(),
            isbn: Selector::parse(".isbn").unwrap(),
        }
    }
}

/// Labirint extractor for www.labirint.ru/books pages.
pub struct LabirintExtractor {
    selectors: Selectors,
}

impl Default for LabirintExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LabirintExtractor {
    /// Creates a new Labirint extractor.
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }

    /// Removes the `Аннотация к книге "..."` wrapper around the title.
    fn clean_title(heading: &str) -> String {
        let title = heading.trim();
        let title = title.strip_prefix("Аннотация к книге \"").unwrap_or(title);
        let title = title.strip_suffix('"').unwrap_or(title);
        title.to_string()
    }
}

impl SiteExtractor for LabirintExtractor {
    fn site(&self) -> SiteId {
        SiteId::Labirint
    }

    fn name(&self) -> &'static str {
        "Labirint"
    }

    fn domain(&self) -> &'static str {
        "www.labirint.ru"
    }

    fn search_filters(&self) -> &'static [&'static str] {
        &["labirint.ru/books"]
    }

    fn extract(&self, url: &str, body: &str) -> Extraction {
        let doc = Html::parse_document(body);
        let s = &self.selectors;
        let mut extraction = Extraction::new(self.site(), url);
        let book = &mut extraction.book;

        for heading in doc.select(&s.title) {
            merge_field(&mut book.name, &Self::clean_title(&element_text(heading)));
        }
        merge_field(&mut book.summary, &first_text(&doc, &s.summary));
        merge_field(&mut book.poster_url, &meta_property(&doc, "og:image"));

        for block in doc.select(&s.persons) {
            let text = element_text(block);
            let Some((_, role)) = ROLE_LABELS.iter().find(|(label, _)| text.starts_with(*label))
            else {
                continue;
            };
            let people = parse_links(block, &s.link);
            let list = match role {
                Role::Author => &mut book.authors,
                Role::Painter => &mut book.painters,
                Role::Editor => &mut book.editors,
                Role::Translator => &mut book.translators,
            };
            list.extend(people);
        }

        merge_field(&mut book.publisher, &first_text(&doc, &s.publisher_link));
        for block in doc.select(&s.publisher) {
            merge_field(&mut book.year, &find_year(&element_text(block)));
        }
        merge_field(&mut book.series, &first_text(&doc, &s.series));

        let isbn = first_text(&doc, &s.isbn);
        merge_field(&mut book.isbn, isbn.strip_prefix("ISBN:").unwrap_or(&isbn));

        extraction
    }
}

/// Parses every link inside `block` as a "Last First" name.
fn parse_links(block: scraper::ElementRef, link: &Selector) -> Vec<Person> {
    block
        .select(link)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .map(|t| Person::parse(&t, false))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta property="og:image" content="https://img.labirint.ru/rc/abc/images/books8/123456/cover.jpg%3F1600000000">
</head>
<body>
  <div id="product-info">
    <div class="authors">Автор: <a href="/authors/1/">Стругацкий Аркадий Натанович</a>, <a href="/authors/2/">Стругацкий Борис Натанович</a></div>
    <div class="authors">Художник: <a href="/authors/3/">Мигунов Евгений</a></div>
    <div class="authors">Редактор: <a href="/authors/4/">Иванова А.</a></div>
    <div class="publisher">Издательство: <a href="/pubhouse/1/">АСТ</a>, 2019 г.</div>
    <div class="series">Серия: <a href="/series/1/">Миры братьев Стругацких</a></div>
    <div class="isbn">ISBN: 978-5-17-090334-4</div>
  </div>
  <div id="product-about">
    <h2>Аннотация к книге "Пикник на обочине"</h2>
    <p>Повесть о Зоне и сталкерах.</p>
    <p>Вторая часть аннотации.</p>
  </div>
</body>
</html>"#;

    const URL: &str = "https://www.labirint.ru/books/123456/";

    #[test]
    fn test_extract_full_page() {
        let extractor = LabirintExtractor::new();
        let extraction = extractor.extract(URL, PAGE);
        let book = &extraction.book;

        assert_eq!(book.name, "Пикник на обочине");
        assert_eq!(book.summary, "Повесть о Зоне и сталкерах.");
        assert_eq!(
            book.poster_url,
            "https://img.labirint.ru/rc/abc/images/books8/123456/cover.jpg?1600000000"
        );
        assert_eq!(book.authors.len(), 2);
        assert_eq!(book.authors[0].last_name, "Стругацкий");
        assert_eq!(book.authors[0].first_name, "Аркадий");
        assert_eq!(book.authors[0].middle_name, "Натанович");
        assert_eq!(book.painters[0].last_name, "Мигунов");
        assert_eq!(book.editors[0].initials, "А.");
        assert!(book.translators.is_empty());
        assert_eq!(book.publisher, "АСТ");
        assert_eq!(book.year, "2019");
        assert_eq!(book.series, "Миры братьев Стругацких");
        assert_eq!(book.isbn, "978-5-17-090334-4");
        assert_eq!(book.urls[&SiteId::Labirint], URL);
        assert!(extraction.genres.is_empty());
    }

    #[test]
    fn test_extract_empty_page_keeps_link() {
        let extraction = LabirintExtractor::new().extract(URL, "<html><body></body></html>");
        assert!(extraction.book.name.is_empty());
        assert!(extraction.book.authors.is_empty());
        assert_eq!(extraction.book.primary_url(), Some(URL));
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(
            LabirintExtractor::clean_title(" Аннотация к книге \"Дюна\" "),
            "Дюна"
        );
        assert_eq!(LabirintExtractor::clean_title("Дюна"), "Дюна");
    }

    #[test]
    fn test_search_filter_and_domain() {
        let extractor = LabirintExtractor::new();
        assert_eq!(extractor.search_filters(), &["labirint.ru/books"]);
        assert!(extractor.can_handle(URL));
        assert!(!extractor.can_handle("https://www.livelib.ru/book/1"));
    }
}
