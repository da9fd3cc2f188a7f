//! Markdown note output.
//!
//! A note is an Obsidian-style markdown file: YAML front matter, a
//! metadata block of `**label:** [[link]]` lines, one link per source site,
//! a shortcut to the book's library folder, and empty sections to be filled
//! in by hand.

use crate::book::Book;
use crate::error::NoteError;
use crate::person::Person;
use crate::translations::UNTAGGED;
use crate::utils::is_latin;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Renders the note for a finalized record.
///
/// `created` goes into the front matter; `library_root` prefixes the
/// library folder shortcut.
pub fn render_note(book: &Book, created: NaiveDateTime, library_root: &str) -> String {
    let mut lines: Vec<String> = vec![
        "---".to_string(),
        format!("created: {}", created.format("%Y-%m-%d %H:%M")),
        format!("alias: \"{} ({})\"", book.name, book.year),
        "---".to_string(),
        String::new(),
        format!(
            "<div style=\"float:right; padding: 10px\"><img width=200px src=\"{}\"/></div>",
            book.poster_url
        ),
        String::new(),
        "![[book.png|50]]".to_string(),
        format!("# {}", book.name),
        format!("**original name:** {}", book.original_name),
        format!("**year:** #y{}", book.year),
        format!("**type:** #{}", book.kind),
        "**status:** #inbox".to_string(),
        "**rate:**".to_string(),
    ];

    lines.extend(label_line("**genres:**", &book.genres));
    lines.extend(persons_line("**author:**", &book.authors));
    lines.extend(persons_line("**painter:**", &book.painters));
    lines.extend(persons_line("**editor:**", &book.editors));
    lines.extend(persons_line("**translators:**", &book.translators));
    lines.push(format!("**publisher:** [[{}]]", book.publisher));
    lines.extend(links_line("**country:**", book.countries.iter().map(String::as_str)));
    if !book.series.is_empty() {
        lines.push(format!("**series:** [[{}]]", book.series));
    }
    lines.extend(label_line("**tags:**", &book.tags));
    lines.push(format!("**isbn:** {}", book.isbn));

    for (site, url) in &book.urls {
        lines.push(format!("**[{}]({})**", site, url));
    }

    if let Some(folder) = library_folder(&book.author_label(), library_root) {
        lines.push(format!("**{{{{shell: open-library-folder \"{}\"}}}}**", folder));
    }

    lines.extend([
        String::new(),
        "---".to_string(),
        String::new(),
        "## Summary".to_string(),
        book.summary.clone(),
        String::new(),
        "## Review".to_string(),
        String::new(),
        "## What attracted attention".to_string(),
        String::new(),
        "## Who might be interested".to_string(),
        String::new(),
        "## Links".to_string(),
        String::new(),
    ]);

    let mut note = lines.join("\n");
    note.push('\n');
    note
}

/// Writes the note into `dir` under the record's file name.
///
/// The record must have been finalized. An existing file is replaced.
pub fn write_note(
    book: &Book,
    dir: &Path,
    created: NaiveDateTime,
    library_root: &str,
) -> Result<PathBuf, NoteError> {
    if book.file_name.is_empty() {
        return Err(NoteError::MissingFileName);
    }

    let path = dir.join(&book.file_name);
    std::fs::write(&path, render_note(book, created, library_root)).map_err(|source| {
        NoteError::WriteError {
            path: path.display().to_string(),
            source,
        }
    })?;

    tracing::info!(path = %path.display(), "note written");
    Ok(path)
}

/// Folder of the author in the library tree:
/// `<root>/<en|ru>/<first letter>/<author label>`.
fn library_folder(author: &str, library_root: &str) -> Option<String> {
    let initial = author.chars().next()?;
    let language = if is_latin(author) { "en" } else { "ru" };
    Some(format!(
        "{}/{}/{}/{}",
        library_root.trim_end_matches('/'),
        language,
        initial,
        author
    ))
}

/// Genre/tag line: `[[translation|label]]`, or `[[label]]` when the label
/// has no translation or is marked untagged.
fn label_line(title: &str, labels: &BTreeMap<String, String>) -> Option<String> {
    if labels.is_empty() {
        return None;
    }
    let items: Vec<String> = labels
        .iter()
        .map(|(label, translation)| {
            if translation.is_empty() || translation == UNTAGGED {
                format!("[[{}]]", label)
            } else {
                format!("[[{}|{}]]", translation, label)
            }
        })
        .collect();
    Some(format!("{} {}", title, items.join(", ")))
}

fn persons_line(title: &str, persons: &[Person]) -> Option<String> {
    let names: Vec<String> = persons.iter().map(Person::printable_name).collect();
    links_line(title, names.iter().map(String::as_str))
}

fn links_line<'a>(title: &str, items: impl Iterator<Item = &'a str>) -> Option<String> {
    let links: Vec<String> = items.map(|item| format!("[[{}]]", item)).collect();
    if links.is_empty() {
        return None;
    }
    Some(format!("{} {}", title, links.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::SiteId;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn sample() -> Book {
        let mut book = Book::from_site(SiteId::Labirint, "https://www.labirint.ru/books/1/");
        book.urls
            .insert(SiteId::Litres, "https://www.litres.ru/book/1/".to_string());
        book.name = "Пикник на обочине".to_string();
        book.year = "2019".to_string();
        book.poster_url = "https://img.example.com/1.jpg".to_string();
        book.publisher = "АСТ".to_string();
        book.isbn = "978-5-17-090334-4".to_string();
        book.summary = "Повесть о Зоне.".to_string();
        book.authors = vec![Person::parse("Стругацкий Аркадий", false)];
        book.genres.insert("фэнтези".to_string(), "fantasy".to_string());
        book.genres.insert("проза".to_string(), UNTAGGED.to_string());
        book.tags.insert("сталкеры".to_string(), String::new());
        book.finalize(".md");
        book
    }

    #[test]
    fn test_render_front_matter_and_metadata() {
        let note = render_note(&sample(), created(), "/Lib");

        assert!(note.starts_with("---\ncreated: 2024-03-09 14:05\nalias: \"Пикник на обочине (2019)\"\n---\n"));
        assert!(note.contains("<img width=200px src=\"https://img.example.com/1.jpg\"/>"));
        assert!(note.contains("\n# Пикник на обочине\n"));
        assert!(note.contains("**year:** #y2019\n"));
        assert!(note.contains("**type:** #book\n"));
        assert!(note.contains("**author:** [[Стругацкий, Аркадий]]\n"));
        assert!(note.contains("**publisher:** [[АСТ]]\n"));
        assert!(note.contains("**isbn:** 978-5-17-090334-4\n"));
        assert!(!note.contains("**painter:**"));
        assert!(!note.contains("**series:**"));
        assert!(note.contains("## Summary\nПовесть о Зоне.\n"));
        assert!(note.ends_with("## Links\n\n"));
    }

    #[test]
    fn test_render_genre_links() {
        let note = render_note(&sample(), created(), "/Lib");
        assert!(note.contains("[[fantasy|фэнтези]]"));
        assert!(note.contains("[[проза]]"));
        assert!(!note.contains("#|проза"));
        assert!(note.contains("**tags:** [[сталкеры]]\n"));
    }

    #[test]
    fn test_render_site_links_in_order() {
        let note = render_note(&sample(), created(), "/Lib");
        let labirint = note.find("**[labirint](https://www.labirint.ru/books/1/)**").unwrap();
        let litres = note.find("**[litres](https://www.litres.ru/book/1/)**").unwrap();
        assert!(labirint < litres);
    }

    #[test]
    fn test_render_library_folder() {
        let note = render_note(&sample(), created(), "/Lib/");
        assert!(note.contains(
            "**{{shell: open-library-folder \"/Lib/ru/С/Стругацкий, Аркадий\"}}**"
        ));

        assert_eq!(
            library_folder("Herbert, Frank", "/Lib").as_deref(),
            Some("/Lib/en/H/Herbert, Frank")
        );
        assert_eq!(library_folder("", "/Lib"), None);
    }

    #[test]
    fn test_write_note() {
        let dir = TempDir::new().unwrap();
        let book = sample();
        let path = write_note(&book, dir.path(), created(), "/Lib").unwrap();

        assert_eq!(path, dir.path().join(&book.file_name));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, render_note(&book, created(), "/Lib"));
    }

    #[test]
    fn test_write_note_requires_file_name() {
        let dir = TempDir::new().unwrap();
        let result = write_note(&Book::default(), dir.path(), created(), "/Lib");
        assert!(matches!(result, Err(NoteError::MissingFileName)));
    }

    #[test]
    fn test_write_note_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = write_note(&sample(), &dir.path().join("absent"), created(), "/Lib");
        assert!(matches!(result, Err(NoteError::WriteError { .. })));
    }
}
