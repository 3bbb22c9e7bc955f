//! Flattened catalog records for importing into a persistent store.
//!
//! Migration scripts scan the folder tree with the same collector as the reader
//! endpoints and hand these rows to the database layer, so imported ids and page URLs
//! match what the folder-backed endpoints serve.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Catalog, MangaMetadata};

/// One manga row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaRecord {
    pub id: String,
    pub title: String,
    pub folder_name: String,
    pub has_volumes: bool,
    pub chapter_count: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cover_url: Option<String>,
    #[serde(flatten)]
    pub metadata: MangaMetadata,
}

/// One chapter row, keyed to its manga by `manga_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub id: String,
    pub manga_id: String,
    pub chapter_number: f64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume_title: Option<String>,
    pub pages: Vec<String>,
    pub page_count: usize,
}

/// Every row produced from one catalog scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub manga: Vec<MangaRecord>,
    pub chapters: Vec<ChapterRecord>,
    /// Chapters left out because they had no pages
    pub skipped_empty_chapters: usize,
    /// Manga folders left out because an earlier folder derived the same id
    pub skipped_duplicate_manga: usize,
}

impl ImportBatch {
    /// Flattens a catalog into import rows.
    ///
    /// Chapters without pages are not imported. Two chapters sharing an id within one
    /// manga abort the batch, since the store would silently keep only one of them.
    /// When manga folders share an id, only the first is imported, matching which
    /// folder a lookup by id resolves to.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        let mut batch = ImportBatch::default();
        let mut manga_ids: HashSet<&str> = HashSet::new();

        for entry in &catalog.manga {
            if !manga_ids.insert(entry.id.as_str()) {
                log::warn!(
                    "Not importing {:?}: manga id '{}' is already taken",
                    entry.folder_name,
                    entry.id
                );
                batch.skipped_duplicate_manga += 1;
                continue;
            }
            let mut chapter_ids: HashSet<&str> = HashSet::new();
            let mut imported = 0;

            for chapter in &entry.chapters {
                if !chapter_ids.insert(chapter.id.as_str()) {
                    return Err(Error::DuplicateChapter {
                        manga_id: entry.id.clone(),
                        volume_number: chapter.volume_number,
                        chapter_number: chapter.chapter_number,
                    });
                }
                if !chapter.is_readable() {
                    batch.skipped_empty_chapters += 1;
                    continue;
                }

                batch.chapters.push(ChapterRecord {
                    id: chapter.id.clone(),
                    manga_id: entry.id.clone(),
                    chapter_number: chapter.chapter_number,
                    title: chapter.title.clone(),
                    volume_number: chapter.volume_number,
                    volume_title: chapter.volume_title.clone(),
                    pages: chapter.pages.clone(),
                    page_count: chapter.pages.len(),
                });
                imported += 1;
            }

            batch.manga.push(MangaRecord {
                id: entry.id.clone(),
                title: entry.title.clone(),
                folder_name: entry.folder_name.clone(),
                has_volumes: entry.has_volumes,
                chapter_count: imported,
                cover_url: entry.cover_url.clone(),
                metadata: entry.metadata.clone(),
            });
        }

        log::info!(
            "Prepared {} manga and {} chapters for import ({} empty chapters, {} duplicate manga skipped)",
            batch.manga.len(),
            batch.chapters.len(),
            batch.skipped_empty_chapters,
            batch.skipped_duplicate_manga
        );
        Ok(batch)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
