//! Manga folder collection and organization module.
//!
//! This module walks a single manga folder through a [`CatalogSource`]: it classifies the
//! folder layout (volumes or flat chapters), parses volume and chapter folder names, and
//! collects the page images of each chapter into public URLs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::Result;
use crate::parser;
use crate::path_utils::{
    compare_paths_by_name, compare_paths_natural, extension_lowercase, get_file_name_lossy,
    public_url,
};
use crate::source::CatalogSource;
use crate::types::{
    Chapter, Layout, PageOrder, ScanFinding, VolumeGroup, find_duplicate_chapters,
    find_repeated_chapter_numbers,
};

/// Name of the folder holding chapter folders
pub const CHAPTERS_FOLDER: &str = "chapters";
/// Name of the container folder holding volume folders
pub const VOLUMES_FOLDER: &str = "volumes";
/// Image extensions recognized as pages when none are configured
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Whether chapter folders are opened to collect their pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Collect every chapter's pages
    Full,
    /// Parse chapter folders only; `pages` stays empty
    Outline,
}

/// The chapters and volumes collected from one manga folder, before ids and
/// metadata are attached.
#[derive(Debug, Clone)]
pub struct MangaScan {
    pub folder: PathBuf,
    pub folder_name: String,
    pub has_volumes: bool,
    pub volumes: Vec<VolumeGroup>,
    pub chapters: Vec<Chapter>,
    pub findings: Vec<ScanFinding>,
}

/// Manages collection and organization of manga folders
#[derive(Debug, Clone)]
pub struct Collector {
    source: Arc<dyn CatalogSource>,
    public_base_path: String,
    image_extensions: Vec<String>,
    page_order: PageOrder,
}

impl Collector {
    /// Creates a new Collector over a source.
    ///
    /// # Arguments
    ///
    /// * `source` - Directory tree holding the manga folders
    /// * `public_base_path` - URL prefix the static file server mounts the root at
    /// * `image_extensions` - Lowercase page extensions, without the dot
    /// * `page_order` - How page files are ordered within a chapter
    pub fn new(
        source: Arc<dyn CatalogSource>,
        public_base_path: impl Into<String>,
        image_extensions: Vec<String>,
        page_order: PageOrder,
    ) -> Self {
        Self {
            source,
            public_base_path: public_base_path.into(),
            image_extensions: image_extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            page_order,
        }
    }

    pub fn source(&self) -> &Arc<dyn CatalogSource> {
        &self.source
    }

    /// Lists every manga folder under the root.
    pub async fn collect_manga_folders(&self) -> Result<Vec<PathBuf>> {
        self.source.list_dirs(Path::new("")).await
    }

    /// Classifies the layout of a manga folder.
    ///
    /// A manga uses volumes when at least one of its subfolders mentions "vol". A
    /// `volumes` container contributes its children as volume folders; otherwise the
    /// matching subfolders are the volumes themselves.
    pub async fn detect_layout(&self, manga_dir: &Path) -> Result<Layout> {
        let subdirs = self.source.list_dirs(manga_dir).await?;

        let volume_candidates: Vec<&PathBuf> = subdirs
            .iter()
            .filter(|dir| parser::is_volume_folder(&get_file_name_lossy(dir)))
            .collect();

        if volume_candidates.is_empty() {
            let chapters_dir = subdirs
                .iter()
                .find(|dir| get_file_name_lossy(dir).eq_ignore_ascii_case(CHAPTERS_FOLDER))
                .cloned();
            return Ok(Layout::Flat { chapters_dir });
        }

        let container = volume_candidates
            .iter()
            .find(|dir| get_file_name_lossy(dir).eq_ignore_ascii_case(VOLUMES_FOLDER));

        let volume_dirs = match container {
            Some(container) => self.source.list_dirs(container).await?,
            None => volume_candidates.into_iter().cloned().collect(),
        };
        Ok(Layout::Volumes { volume_dirs })
    }

    /// True when the path carries one of the recognized image extensions.
    pub fn is_page(&self, path: &Path) -> bool {
        extension_lowercase(path).is_some_and(|ext| self.image_extensions.contains(&ext))
    }

    /// Collects the page URLs of one chapter folder, in page order.
    pub async fn collect_pages(&self, chapter_dir: &Path) -> Result<Vec<String>> {
        let mut pages: Vec<PathBuf> = self
            .source
            .list_files(chapter_dir)
            .await?
            .into_iter()
            .filter(|file| self.is_page(file))
            .collect();

        match self.page_order {
            PageOrder::Lexicographic => pages.par_sort_by(|a, b| compare_paths_by_name(a, b)),
            PageOrder::Natural => pages.par_sort_by(|a, b| compare_paths_natural(a, b)),
        }

        Ok(pages
            .iter()
            .map(|page| public_url(&self.public_base_path, page))
            .collect())
    }

    /// Collects the chapter folders inside `chapters_dir`, sorted by chapter number.
    ///
    /// # Arguments
    ///
    /// * `manga_folder` - Raw manga folder name, used as the id prefix
    /// * `chapters_dir` - Folder whose subfolders are chapters
    /// * `volume` - Number and title of the enclosing volume, if any
    /// * `mode` - Whether to collect pages
    /// * `findings` - Receives fallback numbering and empty chapter findings
    pub async fn collect_chapters(
        &self,
        manga_folder: &str,
        chapters_dir: &Path,
        volume: Option<(u32, &str)>,
        mode: CollectMode,
        findings: &mut Vec<ScanFinding>,
    ) -> Result<Vec<Chapter>> {
        let manga_id = parser::manga_id(manga_folder);
        let chapter_dirs = self.source.list_dirs(chapters_dir).await?;
        let mut chapters = Vec::with_capacity(chapter_dirs.len());

        for (index, chapter_dir) in chapter_dirs.into_iter().enumerate() {
            let folder_name = get_file_name_lossy(&chapter_dir);
            if parser::chapter_number(&folder_name).is_none() {
                log::debug!(
                    "Chapter folder {:?} has no leading number, using position {}",
                    chapter_dir,
                    index + 1
                );
                findings.push(ScanFinding::FallbackNumbering {
                    manga_id: manga_id.clone(),
                    folder_name: folder_name.clone(),
                });
            }
            let (chapter_number, title) = parser::parse_chapter(&folder_name, index);
            let volume_number = volume.map(|(number, _)| number);

            let pages = match mode {
                CollectMode::Full => self.collect_pages(&chapter_dir).await?,
                CollectMode::Outline => Vec::new(),
            };

            let chapter = Chapter {
                id: parser::chapter_id(manga_folder, volume_number, chapter_number),
                chapter_number,
                title,
                volume_number,
                volume_title: volume.map(|(_, title)| title.to_string()),
                pages,
                folder_name,
                folder: chapter_dir,
            };

            if mode == CollectMode::Full && !chapter.is_readable() {
                log::warn!("Chapter {} has no pages", chapter.id);
                findings.push(ScanFinding::EmptyChapter {
                    manga_id: manga_id.clone(),
                    chapter_id: chapter.id.clone(),
                });
            }
            chapters.push(chapter);
        }

        chapters.par_sort_by(|a, b| a.chapter_number.total_cmp(&b.chapter_number));
        Ok(chapters)
    }

    /// Collects a full manga folder: layout, volumes, chapters and (in full mode) pages.
    pub async fn collect_manga(&self, manga_dir: &Path, mode: CollectMode) -> Result<MangaScan> {
        let folder_name = get_file_name_lossy(manga_dir);
        let manga_id = parser::manga_id(&folder_name);
        let mut findings = Vec::new();

        let layout = self.detect_layout(manga_dir).await?;
        let has_volumes = layout.has_volumes();

        let (volumes, chapters) = match layout {
            Layout::Volumes { volume_dirs } => {
                let mut volumes = Vec::with_capacity(volume_dirs.len());
                for (index, volume_dir) in volume_dirs.into_iter().enumerate() {
                    let volume_name = get_file_name_lossy(&volume_dir);
                    if parser::volume_number(&volume_name).is_none() {
                        findings.push(ScanFinding::FallbackNumbering {
                            manga_id: manga_id.clone(),
                            folder_name: volume_name.clone(),
                        });
                    }
                    let (volume_number, volume_title) = parser::parse_volume(&volume_name, index);

                    let nested = volume_dir.join(CHAPTERS_FOLDER);
                    let chapters_dir = if self.source.is_dir(&nested).await {
                        nested
                    } else {
                        volume_dir.clone()
                    };

                    let chapters = self
                        .collect_chapters(
                            &folder_name,
                            &chapters_dir,
                            Some((volume_number, volume_title.as_str())),
                            mode,
                            &mut findings,
                        )
                        .await?;

                    volumes.push(VolumeGroup {
                        volume_number,
                        volume_title,
                        chapters,
                    });
                }
                volumes.par_sort_by_key(|volume| volume.volume_number);
                for pair in volumes.windows(2) {
                    if pair[0].volume_number == pair[1].volume_number {
                        log::warn!(
                            "Manga '{}' has more than one folder for volume {} ({:?} and {:?})",
                            manga_id,
                            pair[1].volume_number,
                            pair[0].volume_title,
                            pair[1].volume_title
                        );
                        findings.push(ScanFinding::DuplicateVolume {
                            manga_id: manga_id.clone(),
                            volume_number: pair[1].volume_number,
                        });
                    }
                }

                // Volumes sharing a number interleave their chapters
                let mut chapters: Vec<Chapter> = volumes
                    .iter()
                    .flat_map(|volume| volume.chapters.iter().cloned())
                    .collect();
                chapters.par_sort_by(|a, b| a.cmp_position(b));

                for chapter_number in find_repeated_chapter_numbers(&chapters) {
                    log::debug!(
                        "Manga '{}' restarts chapter {} in another volume",
                        manga_id,
                        chapter_number
                    );
                    findings.push(ScanFinding::RepeatedChapterNumber {
                        manga_id: manga_id.clone(),
                        chapter_number,
                    });
                }
                (volumes, chapters)
            }
            Layout::Flat {
                chapters_dir: Some(chapters_dir),
            } => {
                let chapters = self
                    .collect_chapters(&folder_name, &chapters_dir, None, mode, &mut findings)
                    .await?;
                (Vec::new(), chapters)
            }
            Layout::Flat { chapters_dir: None } => {
                log::debug!("Manga folder {:?} has no chapters folder", manga_dir);
                findings.push(ScanFinding::MissingChaptersFolder(manga_dir.to_path_buf()));
                (Vec::new(), Vec::new())
            }
        };

        for (volume_number, chapter_number) in find_duplicate_chapters(&chapters) {
            log::warn!(
                "Manga '{}' has more than one chapter {} (volume {:?})",
                manga_id,
                chapter_number,
                volume_number
            );
            findings.push(ScanFinding::DuplicateChapter {
                manga_id: manga_id.clone(),
                volume_number,
                chapter_number,
            });
        }

        Ok(MangaScan {
            folder: manga_dir.to_path_buf(),
            folder_name,
            has_volumes,
            volumes,
            chapters,
            findings,
        })
    }
}
