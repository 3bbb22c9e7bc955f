//! Core data types, enums, and reports for the Hondana catalog library.
//!
//! This module defines the fundamental data structures used throughout Hondana:
//! - The normalized catalog (`Catalog`, `CatalogEntry`, `VolumeGroup`, `Chapter`)
//! - Layout classification of a manga folder (`Layout`)
//! - Presentation metadata (`MangaMetadata`, `MangaStatus`)
//! - Views produced for readers (`MangaSummary`, `ChapterView`, `ChapterSummary`, `MangaInfo`)
//! - Reporting types (`ScanReport`, `ScanFinding`)
//!
//! Everything a reader sees is serialized in camelCase, the shape the web frontend consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// How the folders of a single manga are organized on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// `manga/volumes/<volume>/chapters/<chapter>/page.jpg` (or volume folders directly under the manga)
    Volumes { volume_dirs: Vec<PathBuf> },
    /// `manga/chapters/<chapter>/page.jpg`; `None` when the manga has no `chapters` folder
    Flat { chapters_dir: Option<PathBuf> },
}

impl Layout {
    pub fn has_volumes(&self) -> bool {
        matches!(self, Layout::Volumes { .. })
    }
}

/// Ordering applied to the page files of a chapter.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub enum PageOrder {
    /// Plain string comparison of file names (`10.jpg` sorts before `2.jpg`)
    #[default]
    Lexicographic,
    /// Numeric-aware comparison (`2.jpg` sorts before `10.jpg`)
    Natural,
}

/// Publication status shown next to a manga.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum MangaStatus {
    #[default]
    Ongoing,
    Completed,
}

/// A single chapter folder, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub chapter_number: f64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume_title: Option<String>,
    pub pages: Vec<String>,
    /// Raw chapter folder name
    pub folder_name: String,
    /// Chapter folder relative to the catalog root. Internal use only.
    #[serde(skip)]
    #[cfg_attr(feature = "specta", specta(skip))]
    pub(crate) folder: PathBuf,
}

impl Chapter {
    /// The `(volume, chapter)` key chapters are ordered and de-duplicated by.
    pub fn sort_key(&self) -> (Option<u32>, f64) {
        (self.volume_number, self.chapter_number)
    }

    /// Compares two chapters by volume number (when present), then chapter number.
    pub fn cmp_position(&self, other: &Chapter) -> Ordering {
        self.volume_number
            .cmp(&other.volume_number)
            .then_with(|| self.chapter_number.total_cmp(&other.chapter_number))
    }

    pub fn is_readable(&self) -> bool {
        !self.pages.is_empty()
    }

    /// Chapter folder relative to the catalog root.
    pub fn folder(&self) -> &PathBuf {
        &self.folder
    }

    pub fn summary(&self) -> ChapterSummary {
        ChapterSummary {
            id: self.id.clone(),
            chapter_number: self.chapter_number,
            title: self.title.clone(),
            volume_number: self.volume_number,
        }
    }
}

/// A volume folder and the chapters nested inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct VolumeGroup {
    pub volume_number: u32,
    /// Raw volume folder name, used verbatim as the display label
    pub volume_title: String,
    pub chapters: Vec<Chapter>,
}

/// Presentation fields that are not sourced from the folder tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct MangaMetadata {
    pub description: String,
    pub author: String,
    pub genres: Vec<String>,
    pub rating: f32,
    pub views: u64,
    pub status: MangaStatus,
}

/// One manga series, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    /// Raw manga folder name
    pub folder_name: String,
    pub has_volumes: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volumes: Option<Vec<VolumeGroup>>,
    /// Every chapter of the manga, in volume order then chapter order
    pub chapters: Vec<Chapter>,
    /// First page of the first readable chapter
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cover_url: Option<String>,
    #[serde(flatten)]
    pub metadata: MangaMetadata,
}

impl CatalogEntry {
    pub fn volume_count(&self) -> usize {
        self.volumes.as_ref().map_or(0, |v| v.len())
    }

    pub fn page_count(&self) -> usize {
        self.chapters.iter().map(|c| c.pages.len()).sum()
    }

    pub fn summary(&self) -> MangaSummary {
        MangaSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            has_volumes: self.has_volumes,
            volume_count: self.volume_count(),
            chapter_count: self.chapters.len(),
            cover_url: self.cover_url.clone(),
            status: self.metadata.status,
        }
    }

    pub fn info(&self) -> MangaInfo {
        MangaInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            has_volumes: self.has_volumes,
            volume_count: self.volume_count(),
            chapter_count: self.chapters.len(),
        }
    }
}

/// The full result of a catalog scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub manga: Vec<CatalogEntry>,
    pub scanned_at: DateTime<Utc>,
    pub report: ScanReport,
}

impl Catalog {
    pub fn get(&self, manga_id: &str) -> Option<&CatalogEntry> {
        self.manga.iter().find(|m| m.id == manga_id)
    }
}

/// A compact row for "list all manga" responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct MangaSummary {
    pub id: String,
    pub title: String,
    pub has_volumes: bool,
    pub volume_count: usize,
    pub chapter_count: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cover_url: Option<String>,
    pub status: MangaStatus,
}

/// Basic manga fields attached to a chapter view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct MangaInfo {
    pub id: String,
    pub title: String,
    pub has_volumes: bool,
    pub volume_count: usize,
    pub chapter_count: usize,
}

/// A navigation entry: enough to render a chapter list without its pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub id: String,
    pub chapter_number: f64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub volume_number: Option<u32>,
}

/// A single readable chapter plus the sibling list used for previous/next navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub manga: MangaInfo,
    pub chapter: Chapter,
    pub navigation: Vec<ChapterSummary>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub previous: Option<ChapterSummary>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next: Option<ChapterSummary>,
}

/// A data-quality observation made while scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub enum ScanFinding {
    /// The manga folder could not be scanned and was left out of the catalog
    SkippedManga(PathBuf, String),
    /// The folder name contains no letters or digits, so no id can be derived
    EmptyMangaId(PathBuf),
    /// Two manga folders derive the same id; only the first is reachable by id
    DuplicateMangaId(String, PathBuf),
    /// Neither a volume folder nor a `chapters` folder exists
    MissingChaptersFolder(PathBuf),
    DuplicateChapter {
        manga_id: String,
        volume_number: Option<u32>,
        chapter_number: f64,
    },
    EmptyChapter {
        manga_id: String,
        chapter_id: String,
    },
    /// The folder name carried no number; its position was used instead
    FallbackNumbering {
        manga_id: String,
        folder_name: String,
    },
    /// Two volume folders parse to the same volume number
    DuplicateVolume {
        manga_id: String,
        volume_number: u32,
    },
    /// The chapter number appears in more than one volume, so locating it needs a volume
    RepeatedChapterNumber {
        manga_id: String,
        chapter_number: f64,
    },
}

/// Summary of a catalog scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub findings: Vec<ScanFinding>,
    pub manga_scanned: usize,
    pub manga_skipped: usize,
    pub chapters_found: usize,
    pub pages_found: usize,
}

impl ScanReport {
    pub fn duplicate_chapters(&self) -> impl Iterator<Item = &ScanFinding> {
        self.findings
            .iter()
            .filter(|f| matches!(f, ScanFinding::DuplicateChapter { .. }))
    }
}

/// Returns the `(volume, chapter)` keys shared by more than one chapter.
///
/// Expects `chapters` to already be in position order.
pub fn find_duplicate_chapters(chapters: &[Chapter]) -> Vec<(Option<u32>, f64)> {
    let mut duplicates: Vec<(Option<u32>, f64)> = Vec::new();
    for pair in chapters.windows(2) {
        if pair[0].cmp_position(&pair[1]) == Ordering::Equal {
            let key = pair[1].sort_key();
            if duplicates.last() != Some(&key) {
                duplicates.push(key);
            }
        }
    }
    duplicates
}

/// Returns the chapter numbers that appear in more than one volume.
///
/// Series that restart numbering per volume produce these; they are ambiguous when a
/// chapter is requested by number alone.
pub fn find_repeated_chapter_numbers(chapters: &[Chapter]) -> Vec<f64> {
    let mut keys: Vec<(f64, Option<u32>)> = chapters
        .iter()
        .map(|chapter| (chapter.chapter_number, chapter.volume_number))
        .collect();
    keys.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut repeated: Vec<f64> = Vec::new();
    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.0 == b.0 && a.1 != b.1 && repeated.last() != Some(&b.0) {
            repeated.push(b.0);
        }
    }
    repeated
}
