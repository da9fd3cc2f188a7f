//! Persistent cache of genre/tag translations.
//!
//! The cache is a flat JSON object mapping a lowercase source label to its
//! translation. It is loaded once when the program starts and saved once
//! at the end; misses go to a [`TranslationProvider`] and are remembered.
//!
//! The value `"#"` marks a label that is known but deliberately left
//! untranslated. It is returned like any other value and suppresses the
//! translation annotation when notes are rendered.

use crate::book::Book;
use crate::error::{CacheError, TranslationError};
use crate::translator::TranslationProvider;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Cache value for "known, intentionally not tagged".
pub const UNTAGGED: &str = "#";

/// Genre/tag translation cache backed by a JSON file.
pub struct TranslationCache {
    /// Path to the JSON file.
    filepath: PathBuf,
    /// Source label to translation.
    data: BTreeMap<String, String>,
    /// Translation backend for misses.
    provider: Box<dyn TranslationProvider>,
    /// Whether entries were added since the last save.
    dirty: bool,
}

impl TranslationCache {
    /// Opens the cache stored at `filepath`.
    ///
    /// A missing file yields an empty cache; an unreadable or malformed
    /// file is an error.
    pub fn load(
        filepath: impl Into<PathBuf>,
        provider: Box<dyn TranslationProvider>,
    ) -> Result<Self, CacheError> {
        let filepath = filepath.into();
        let data = if filepath.exists() {
            let content = std::fs::read_to_string(&filepath)?;
            serde_json::from_str(&content)?
        } else {
            tracing::info!(path = %filepath.display(), "no translation cache yet, starting empty");
            BTreeMap::new()
        };

        Ok(Self {
            filepath,
            data,
            provider,
            dirty: false,
        })
    }

    /// Get the filepath for this cache.
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Writes the cache to disk as pretty-printed JSON.
    ///
    /// The file is replaced atomically, so an interrupted save leaves the
    /// previous version intact.
    pub fn save(&mut self) -> Result<(), CacheError> {
        if let Some(parent) = self.filepath.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::WriteError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.filepath.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| CacheError::WriteError(e.to_string()))?;
        std::fs::rename(&tmp, &self.filepath)
            .map_err(|e| CacheError::WriteError(e.to_string()))?;

        self.dirty = false;
        Ok(())
    }

    /// Whether the cache holds entries that have not been saved yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Looks up a cached translation without asking the backend.
    pub fn get(&self, term: &str) -> Option<&str> {
        self.data
            .get(term)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Inserts or replaces a cache entry.
    pub fn insert(&mut self, term: impl Into<String>, translation: impl Into<String>) {
        self.data.insert(term.into(), translation.into());
        self.dirty = true;
    }

    /// Translates an already lowercased term.
    ///
    /// Cached values (including `"#"`) are returned as is. On a miss the
    /// backend is asked; a non-empty answer is cached. An empty answer is
    /// returned but not cached. Backend failures are returned to the caller.
    pub async fn translate(&mut self, term: &str) -> Result<String, TranslationError> {
        if let Some(hit) = self.get(term) {
            return Ok(hit.to_string());
        }

        let translation = self.provider.translate(term).await?;
        if !translation.is_empty() {
            tracing::info!(term, translation = %translation, "new translation");
            self.insert(term, translation.clone());
        }
        Ok(translation)
    }

    /// Lowercases and translates a genre label, then records it on `book`.
    pub async fn append_genre(&mut self, book: &mut Book, label: &str) -> Result<(), TranslationError> {
        let (key, translation) = self.translate_label(label).await?;
        if !key.is_empty() {
            book.genres.insert(key, translation);
        }
        Ok(())
    }

    /// Lowercases and translates a tag label, then records it on `book`.
    pub async fn append_tag(&mut self, book: &mut Book, label: &str) -> Result<(), TranslationError> {
        let (key, translation) = self.translate_label(label).await?;
        if !key.is_empty() {
            book.tags.insert(key, translation);
        }
        Ok(())
    }

    async fn translate_label(&mut self, label: &str) -> Result<(String, String), TranslationError> {
        let key = label.trim().to_lowercase();
        if key.is_empty() {
            return Ok((key, String::new()));
        }
        let translation = self.translate(&key).await?;
        if translation.is_empty() {
            tracing::warn!(label = %key, "can't translate");
        }
        Ok((key, translation))
    }
}
