//! One query, end to end: search, choose, enrich, write.

use crate::config::NoteConfig;
use crate::console::Console;
use crate::finder::BookFinder;
use crate::note::write_note;
use crate::selection::{Operator, describe};
use crate::translations::TranslationCache;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No site produced a candidate.
    NothingFound,
    /// Candidates were shown and all were declined.
    Declined,
    /// A note was written to this path.
    Written(PathBuf),
}

/// Drives a single query through the finder, the operator and the note
/// writer.
pub struct Pipeline {
    finder: BookFinder,
    operator: Box<dyn Operator>,
    note: NoteConfig,
    supplement: bool,
    console: Console,
}

impl Pipeline {
    /// Create a new Pipeline.
    ///
    /// Notes go to `note.output_directory`; `supplement` turns enrichment
    /// from the supplement sites on or off.
    pub fn new(
        finder: BookFinder,
        operator: Box<dyn Operator>,
        note: NoteConfig,
        supplement: bool,
        console: Console,
    ) -> Self {
        Self {
            finder,
            operator,
            note,
            supplement,
            console,
        }
    }

    /// Runs `query`. The cache is updated but not saved.
    pub async fn run(&mut self, query: &str, cache: &mut TranslationCache) -> Result<Outcome> {
        self.console.step(&format!("Searching for \"{}\"...", query));
        let mut candidates = self
            .finder
            .candidates(query, cache)
            .await
            .context("Failed to collect candidates")?;

        if candidates.is_empty() {
            return Ok(Outcome::NothingFound);
        }

        // The listing shows file names, so derive them now.
        for candidate in &mut candidates {
            candidate.finalize(&self.note.extension);
        }

        let index = if candidates.len() == 1 {
            self.console
                .info(&format!("Single match: {}", describe(&candidates[0])));
            0
        } else {
            match self.operator.choose(&candidates) {
                Some(i) if i < candidates.len() => i,
                _ => return Ok(Outcome::Declined),
            }
        };
        let mut book = candidates.swap_remove(index);

        if self.supplement {
            self.console.step("Looking for missing details...");
            self.finder
                .enrich(&mut book, query, cache)
                .await
                .context("Failed to enrich the chosen book")?;
        }
        book.finalize(&self.note.extension);

        let created = chrono::Local::now().naive_local();
        let path = write_note(
            &book,
            &self.note.output_directory,
            created,
            &self.note.library_root,
        )
        .context("Failed to write note")?;

        Ok(Outcome::Written(path))
    }
}
