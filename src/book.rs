//! The aggregate book record and its finalisation rules.
//!
//! A [`Book`] is filled by one site extractor (a partial record), possibly
//! topped up from a supplementary site, and finally given a file name
//! derived from its authors and title.

use crate::person::Person;
use crate::utils::is_latin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Titles up to this many characters are used verbatim in file names.
const MAX_TITLE_CHARS: usize = 75;

/// Length of a hard-truncated title, before the ellipsis.
const TRUNCATED_TITLE_CHARS: usize = 72;

/// Source sites a book record can link to.
///
/// Declaration order is the order links are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteId {
    Labirint,
    Goodreads,
    Flibusta,
    Litres,
    Livelib,
    Ozon,
}

impl SiteId {
    /// Lowercase identifier, also used as the link label in notes.
    pub fn as_str(self) -> &'static str {
        match self {
            SiteId::Labirint => "labirint",
            SiteId::Goodreads => "goodreads",
            SiteId::Flibusta => "flibusta",
            SiteId::Litres => "litres",
            SiteId::Livelib => "livelib",
            SiteId::Ozon => "ozon",
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bibliographic record for one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Fixed type tag rendered into the note.
    pub kind: String,
    pub name: String,
    pub original_name: String,
    pub poster_url: String,
    /// Four-digit year or empty.
    pub year: String,
    /// Source-language label (lowercase) to translated label.
    pub genres: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
    pub series: String,
    pub authors: Vec<Person>,
    pub painters: Vec<Person>,
    pub editors: Vec<Person>,
    pub translators: Vec<Person>,
    pub countries: Vec<String>,
    pub publisher: String,
    pub isbn: String,
    pub summary: String,
    /// Canonical page of this book on each source site.
    pub urls: BTreeMap<SiteId, String>,
    /// Derived by [`Book::finalize`].
    pub file_name: String,
}

impl Default for Book {
    fn default() -> Self {
        Self {
            kind: "book".to_string(),
            name: String::new(),
            original_name: String::new(),
            poster_url: String::new(),
            year: String::new(),
            genres: BTreeMap::new(),
            tags: BTreeMap::new(),
            series: String::new(),
            authors: Vec::new(),
            painters: Vec::new(),
            editors: Vec::new(),
            translators: Vec::new(),
            countries: Vec::new(),
            publisher: String::new(),
            isbn: String::new(),
            summary: String::new(),
            urls: BTreeMap::new(),
            file_name: String::new(),
        }
    }
}

/// Stores `candidate` into `existing` only if `existing` is still empty.
///
/// Candidates are trimmed; a blank candidate never counts as a value.
/// Returns true if the field was written.
pub fn merge_field(existing: &mut String, candidate: &str) -> bool {
    let candidate = candidate.trim();
    if !existing.is_empty() || candidate.is_empty() {
        return false;
    }
    *existing = candidate.to_string();
    true
}

fn merge_persons(existing: &mut Vec<Person>, candidate: Vec<Person>) {
    if existing.is_empty() {
        *existing = candidate;
    }
}

impl Book {
    /// Creates an empty record linked to `url` on `site`.
    pub fn from_site(site: SiteId, url: &str) -> Self {
        let mut book = Book::default();
        book.urls.insert(site, url.to_string());
        book
    }

    /// Tops this record up from `other` without overwriting anything set.
    ///
    /// Scalar fields and person lists follow first-writer-wins; genres,
    /// tags, countries and links gain only entries that are not present yet.
    pub fn merge(&mut self, other: Book) {
        merge_field(&mut self.name, &other.name);
        merge_field(&mut self.original_name, &other.original_name);
        merge_field(&mut self.poster_url, &other.poster_url);
        merge_field(&mut self.year, &other.year);
        merge_field(&mut self.series, &other.series);
        merge_field(&mut self.publisher, &other.publisher);
        merge_field(&mut self.isbn, &other.isbn);
        merge_field(&mut self.summary, &other.summary);

        merge_persons(&mut self.authors, other.authors);
        merge_persons(&mut self.painters, other.painters);
        merge_persons(&mut self.editors, other.editors);
        merge_persons(&mut self.translators, other.translators);

        for (label, translation) in other.genres {
            self.genres.entry(label).or_insert(translation);
        }
        for (label, translation) in other.tags {
            self.tags.entry(label).or_insert(translation);
        }
        for country in other.countries {
            if !self.countries.contains(&country) {
                self.countries.push(country);
            }
        }
        for (site, url) in other.urls {
            self.urls.entry(site).or_insert(url);
        }
    }

    /// First link of the record, used to identify a candidate.
    pub fn primary_url(&self) -> Option<&str> {
        self.urls.values().next().map(String::as_str)
    }

    /// Builds the author part of the file name.
    ///
    /// Authors are ordered by last name. Two authors are joined with
    /// " and " or " и " depending on whether the first one is written in
    /// Latin script; three or more get " et al" or " и др." instead.
    pub fn author_label(&self) -> String {
        let mut authors: Vec<&Person> = self.authors.iter().collect();
        authors.sort_by(|a, b| a.last_name.cmp(&b.last_name));

        let Some(first) = authors.first() else {
            return String::new();
        };

        let mut label = first.printable_name();
        match authors.len() {
            1 => {}
            2 => {
                let conjunction = if is_latin(&label) { " and " } else { " и " };
                label.push_str(conjunction);
                label.push_str(&authors[1].printable_name());
            }
            _ => {
                let marker = if is_latin(&label) { " et al" } else { " и др." };
                label.push_str(marker);
            }
        }
        label
    }

    /// Sorts authors and derives the note file name.
    ///
    /// Must run after the last change to `authors` or `name`.
    pub fn finalize(&mut self, extension: &str) {
        self.authors.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        let name = format!(
            "{} - {}{}",
            self.author_label(),
            truncate_title(&self.name),
            extension
        );
        self.file_name = sanitize_file_name(&name);
    }
}

/// Shortens long titles for use in a file name.
///
/// Up to 75 characters the title is kept; longer titles are cut at their
/// first period, or else hard-cut to 72 characters plus "...".
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    if let Some((head, _)) = title.split_once('.') {
        return head.to_string();
    }
    let mut cut: String = title.chars().take(TRUNCATED_TITLE_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Strips or replaces characters that are unsafe in file names.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '<' | '>' | '«' | '»' | '*' => {}
            ':' => out.push_str(" -"),
            '/' | '\\' | '|' => out.push('-'),
            '?' => out.push('.'),
            _ => out.push(c),
        }
    }
    out
}

/// Groups a raw 13-digit ISBN as `978-5-17123-456-7`.
///
/// Returns `None` unless the input is exactly 13 ASCII digits.
pub fn format_isbn13(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() != 13 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "{}-{}-{}-{}-{}",
        &raw[0..3],
        &raw[3..4],
        &raw[4..9],
        &raw[9..12],
        &raw[12..13]
    ))
}
