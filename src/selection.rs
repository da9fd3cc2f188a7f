//! Choosing one candidate out of several.

use crate::book::Book;
use crate::console::Console;

/// Whoever picks the record to keep when a search yields several.
pub trait Operator {
    /// Returns the index of the chosen candidate, or `None` to discard all.
    fn choose(&mut self, candidates: &[Book]) -> Option<usize>;
}

/// Interprets an answer to the candidate prompt.
///
/// `1..=count` selects a candidate (returned 0-based). Anything else,
/// including an empty answer, `0` and unparsable text, means "none".
pub fn parse_choice(answer: &str, count: usize) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        Ok(0) => None,
        Ok(n) => {
            tracing::warn!(choice = n, count, "choice out of range, treating as none");
            None
        }
        Err(_) => {
            tracing::warn!(answer, "choice is not a number, treating as none");
            None
        }
    }
}

/// One line describing a candidate in the listing.
pub fn describe(book: &Book) -> String {
    format!(
        "\"{}\" [{}] publisher: {}",
        book.file_name, book.year, book.publisher
    )
}

/// Asks the person at the terminal.
pub struct StdinOperator {
    console: Console,
}

impl StdinOperator {
    /// Create a new StdinOperator.
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl Operator for StdinOperator {
    fn choose(&mut self, candidates: &[Book]) -> Option<usize> {
        let c = &self.console;
        c.section("=======");
        eprintln!("{}", c.menu_entry(0, "none", None));
        for (i, book) in candidates.iter().enumerate() {
            eprintln!(
                "{}",
                c.menu_entry(i + 1, &describe(book), book.primary_url())
            );
        }

        match c.prompt("Choose a book:") {
            Ok(answer) => parse_choice(&answer, candidates.len()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read choice");
                None
            }
        }
    }
}
