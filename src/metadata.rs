//! Presentation metadata for catalog entries.
//!
//! The folder tree only yields ids, titles, chapters and pages. Everything else a reader
//! shows (description, author, genres, rating, views, status) comes from a
//! [`MetadataProvider`]: either fixed placeholders or an external metadata store.

use std::collections::HashMap;
use std::fmt::Debug;

use crate::types::{MangaMetadata, MangaStatus};

/// Chapter count above which a manga is considered completed
pub const DEFAULT_COMPLETED_THRESHOLD: usize = 50;

/// Supplies the metadata fields that are not derived from the folder tree.
pub trait MetadataProvider: Debug + Send + Sync {
    /// # Arguments
    ///
    /// * `manga_id` - Derived manga id
    /// * `title` - Derived display title
    /// * `chapter_count` - Number of chapters found for the manga
    fn metadata(&self, manga_id: &str, title: &str, chapter_count: usize) -> MangaMetadata;
}

/// Fixed placeholders, with the status guessed from the chapter count.
#[derive(Debug, Clone, Copy)]
pub struct DefaultMetadata {
    pub completed_threshold: usize,
}

impl Default for DefaultMetadata {
    fn default() -> Self {
        Self {
            completed_threshold: DEFAULT_COMPLETED_THRESHOLD,
        }
    }
}

impl DefaultMetadata {
    pub fn new(completed_threshold: usize) -> Self {
        Self {
            completed_threshold,
        }
    }

    pub fn status_for(&self, chapter_count: usize) -> MangaStatus {
        if chapter_count > self.completed_threshold {
            MangaStatus::Completed
        } else {
            MangaStatus::Ongoing
        }
    }
}

impl MetadataProvider for DefaultMetadata {
    fn metadata(&self, _manga_id: &str, title: &str, chapter_count: usize) -> MangaMetadata {
        MangaMetadata {
            description: format!("Read {} online.", title),
            author: "Unknown".to_string(),
            genres: Vec::new(),
            rating: 0.0,
            views: 0,
            status: self.status_for(chapter_count),
        }
    }
}

/// Metadata looked up by manga id, falling back to [`DefaultMetadata`] for unknown ids.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    entries: HashMap<String, MangaMetadata>,
    fallback: DefaultMetadata,
}

impl StaticMetadata {
    pub fn new(fallback: DefaultMetadata) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    pub fn with_entry(mut self, manga_id: impl Into<String>, metadata: MangaMetadata) -> Self {
        self.entries.insert(manga_id.into(), metadata);
        self
    }
}

impl MetadataProvider for StaticMetadata {
    fn metadata(&self, manga_id: &str, title: &str, chapter_count: usize) -> MangaMetadata {
        match self.entries.get(manga_id) {
            Some(metadata) => metadata.clone(),
            None => self.fallback.metadata(manga_id, title, chapter_count),
        }
    }
}
