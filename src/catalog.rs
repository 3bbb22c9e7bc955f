use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::spawn;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::collector::{CollectMode, Collector, DEFAULT_IMAGE_EXTENSIONS, MangaScan};
use crate::error::{Error, Result};
use crate::metadata::{DEFAULT_COMPLETED_THRESHOLD, DefaultMetadata, MetadataProvider};
use crate::parser;
use crate::path_utils::get_file_name_lossy;
use crate::source::{CatalogSource, FsSource};
use crate::types::{
    Catalog, CatalogEntry, ChapterView, MangaSummary, PageOrder, ScanFinding, ScanReport,
};

/// URL prefix under which the static file server exposes the catalog root
pub const DEFAULT_PUBLIC_BASE_PATH: &str = "/manga";

fn default_image_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_max_concurrent_scans() -> usize {
    num_cpus::get().min(8)
}

/// The catalog configuration, built declaratively using the builder pattern.
///
/// Every read operation rescans the source: there is no cache to invalidate, so two
/// calls always reflect the folder tree as it is at the time of the call.
///
/// - [`scan_catalog`](CatalogConfig::scan_catalog): every manga, fully collected
/// - [`list_manga`](CatalogConfig::list_manga): one summary row per manga
/// - [`scan_manga`](CatalogConfig::scan_manga): a single manga by id
/// - [`locate_chapter`](CatalogConfig::locate_chapter): one chapter with sibling navigation
///
/// ## Builder Pattern
///
/// ```rust,no_run
/// # use hondana::prelude::*;
/// # #[tokio::main]
/// # async fn main() -> hondana::error::Result<()> {
/// let config = CatalogConfig::builder()
///     .root_path("./public/manga")
///     .public_base_path("/manga")
///     .page_order(PageOrder::Natural)
///     .build()?;
///
/// let view = config.locate_chapter_str("attackontitan", "1").await?;
/// println!("{} has {} pages", view.chapter.title, view.chapter.pages.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct CatalogConfig {
    /// Directory whose immediate children are manga folders.
    ///
    /// Used by the default filesystem source; ignored when [`source`](CatalogConfig::source) is set.
    #[builder(default)]
    pub root_path: PathBuf,

    /// URL prefix the static file server mounts `root_path` at.
    ///
    /// Page URLs are this prefix followed by the encoded path of the image relative to
    /// the root, e.g. `/manga/berserk/chapters/1%20-%20Prologue/01.jpg`.
    #[builder(default = "DEFAULT_PUBLIC_BASE_PATH.to_string()")]
    pub public_base_path: String,

    /// Ordering of page files within a chapter.
    #[builder(default)]
    pub page_order: PageOrder,

    /// Recognized page extensions, matched case-insensitively.
    #[builder(default = "default_image_extensions()")]
    pub image_extensions: Vec<String>,

    /// Maximum number of manga folders scanned at once.
    #[builder(default = "default_max_concurrent_scans()")]
    pub max_concurrent_scans: usize,

    /// Chapter count above which the default metadata reports a manga as completed.
    #[builder(default = "DEFAULT_COMPLETED_THRESHOLD")]
    pub completed_threshold: usize,

    /// Custom directory source, e.g. an in-memory tree.
    #[builder(default)]
    pub source: Option<Arc<dyn CatalogSource>>,

    /// Custom metadata store. Defaults to placeholder metadata.
    #[builder(default)]
    pub metadata_provider: Option<Arc<dyn MetadataProvider>>,
}

impl CatalogConfig {
    /// Creates a new builder for configuring `CatalogConfig`.
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Validates that the catalog root can be scanned.
    ///
    /// Custom sources are trusted to own their root; for the filesystem source the root
    /// must exist and be a directory.
    pub fn preflight_check(&self) -> Result<&Self> {
        if self.source.is_some() {
            return Ok(self);
        }
        if self.root_path.as_os_str().is_empty() {
            return Err(Error::Other("`root_path` must be set.".to_string()));
        }
        if !self.root_path.exists() {
            return Err(Error::InvalidPath(
                self.root_path.clone(),
                "Root path does not exist.".to_string(),
            ));
        }
        if !self.root_path.is_dir() {
            return Err(Error::InvalidPath(
                self.root_path.clone(),
                "Root path is not a directory.".to_string(),
            ));
        }
        Ok(self)
    }

    /// The configured source, or a filesystem source over `root_path`.
    pub fn resolved_source(&self) -> Arc<dyn CatalogSource> {
        match &self.source {
            Some(source) => Arc::clone(source),
            None => Arc::new(FsSource::new(self.root_path.clone())),
        }
    }

    pub fn resolved_metadata_provider(&self) -> Arc<dyn MetadataProvider> {
        match &self.metadata_provider {
            Some(provider) => Arc::clone(provider),
            None => Arc::new(DefaultMetadata::new(self.completed_threshold)),
        }
    }

    pub fn collector(&self) -> Collector {
        Collector::new(
            self.resolved_source(),
            self.public_base_path.clone(),
            self.image_extensions.clone(),
            self.page_order,
        )
    }

    /// Scans every manga folder under the root into a catalog.
    ///
    /// A manga folder that fails to scan, or whose scan task panics, is left out, logged,
    /// and recorded in the report; only an unreadable root fails the whole scan.
    pub async fn scan_catalog(&self) -> Result<Catalog> {
        self.preflight_check()?;
        let collector = self.collector();
        let provider = self.resolved_metadata_provider();

        let folders = collector.collect_manga_folders().await?;
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_scans));
        let mut handles: Vec<JoinHandle<Result<MangaScan>>> = Vec::new();

        for folder in folders.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let collector = collector.clone();

            handles.push(spawn(async move {
                let _permit = semaphore.acquire().await?;
                collector.collect_manga(&folder, CollectMode::Full).await
            }));
        }

        let results = join_all(handles).await;

        let mut report = ScanReport::default();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut manga = Vec::with_capacity(results.len());

        for (folder, result) in folders.into_iter().zip(results) {
            let mut scan = match result.map_err(Error::from).and_then(|scan| scan) {
                Ok(scan) => scan,
                Err(e) => {
                    log::error!("Skipping manga folder {:?}: {}", folder, e);
                    report.manga_skipped += 1;
                    report
                        .findings
                        .push(ScanFinding::SkippedManga(folder, e.to_string()));
                    continue;
                }
            };

            let id = parser::manga_id(&scan.folder_name);
            if id.is_empty() {
                log::warn!("Manga folder {:?} derives an empty id, skipping", folder);
                report.manga_skipped += 1;
                report.findings.push(ScanFinding::EmptyMangaId(folder));
                continue;
            }
            if !seen_ids.insert(id.clone()) {
                log::warn!("Manga folder {:?} repeats the id '{}'", folder, id);
                report
                    .findings
                    .push(ScanFinding::DuplicateMangaId(id, folder.clone()));
            }

            report.findings.append(&mut scan.findings);
            let entry = build_entry(scan, provider.as_ref());
            report.manga_scanned += 1;
            report.chapters_found += entry.chapters.len();
            report.pages_found += entry.page_count();
            manga.push(entry);
        }

        log::info!(
            "Scanned {} manga ({} skipped), {} chapters, {} pages",
            report.manga_scanned,
            report.manga_skipped,
            report.chapters_found,
            report.pages_found
        );

        Ok(Catalog {
            manga,
            scanned_at: Utc::now(),
            report,
        })
    }

    /// Lists one summary row per manga.
    pub async fn list_manga(&self) -> Result<Vec<MangaSummary>> {
        let catalog = self.scan_catalog().await?;
        Ok(catalog.manga.iter().map(CatalogEntry::summary).collect())
    }

    /// Resolves a manga id to its folder by re-deriving the id of every manga folder.
    pub async fn find_manga_folder(&self, manga_id: &str) -> Result<PathBuf> {
        self.preflight_check()?;
        find_manga_folder(&self.collector(), manga_id).await
    }

    /// Scans a single manga, with every chapter's pages.
    pub async fn scan_manga(&self, manga_id: &str) -> Result<CatalogEntry> {
        self.preflight_check()?;
        let collector = self.collector();
        let folder = find_manga_folder(&collector, manga_id).await?;
        let scan = collector.collect_manga(&folder, CollectMode::Full).await?;
        Ok(build_entry(scan, self.resolved_metadata_provider().as_ref()))
    }

    /// Locates one chapter by number, with the manga's full chapter list for navigation.
    ///
    /// # Errors
    ///
    /// * [`Error::MangaNotFound`] - no manga folder derives `manga_id`
    /// * [`Error::ChapterNotFound`] - no chapter parses to `chapter_number`
    /// * [`Error::DuplicateChapter`] - more than one chapter parses to `chapter_number`.
    ///   Series that restart numbering in every volume (reported by the scan as
    ///   [`ScanFinding::RepeatedChapterNumber`]) need
    ///   [`locate_volume_chapter`](CatalogConfig::locate_volume_chapter) instead.
    /// * [`Error::ChapterFolderNotFound`] - the chapter folder vanished before its pages were read
    /// * [`Error::NoPages`] - the chapter folder holds no page images
    pub async fn locate_chapter(&self, manga_id: &str, chapter_number: f64) -> Result<ChapterView> {
        self.locate(manga_id, None, chapter_number).await
    }

    /// Like [`locate_chapter`](CatalogConfig::locate_chapter), with the number given as text.
    pub async fn locate_chapter_str(&self, manga_id: &str, chapter_number: &str) -> Result<ChapterView> {
        let chapter_number = parser::parse_chapter_request(chapter_number)?;
        self.locate(manga_id, None, chapter_number).await
    }

    /// Locates a chapter within one volume, for series that restart numbering per volume.
    pub async fn locate_volume_chapter(
        &self,
        manga_id: &str,
        volume_number: u32,
        chapter_number: f64,
    ) -> Result<ChapterView> {
        self.locate(manga_id, Some(volume_number), chapter_number)
            .await
    }

    async fn locate(
        &self,
        manga_id: &str,
        volume_number: Option<u32>,
        chapter_number: f64,
    ) -> Result<ChapterView> {
        self.preflight_check()?;
        let collector = self.collector();
        let folder = find_manga_folder(&collector, manga_id).await?;
        let scan = collector
            .collect_manga(&folder, CollectMode::Outline)
            .await?;
        let entry = build_entry(scan, self.resolved_metadata_provider().as_ref());

        let matches: Vec<usize> = entry
            .chapters
            .iter()
            .enumerate()
            .filter(|(_, chapter)| {
                chapter.chapter_number == chapter_number
                    && volume_number.is_none_or(|volume| chapter.volume_number == Some(volume))
            })
            .map(|(index, _)| index)
            .collect();

        let index = match matches.as_slice() {
            [] => {
                return Err(Error::ChapterNotFound {
                    manga_id: manga_id.to_string(),
                    chapter_number,
                });
            }
            [index] => *index,
            [..] => {
                return Err(Error::DuplicateChapter {
                    manga_id: manga_id.to_string(),
                    volume_number,
                    chapter_number,
                });
            }
        };

        let mut chapter = entry.chapters[index].clone();
        chapter.pages = match collector.collect_pages(chapter.folder()).await {
            Ok(pages) => pages,
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ChapterFolderNotFound(chapter.folder().clone()));
            }
            Err(e) => return Err(e),
        };
        if !chapter.is_readable() {
            return Err(Error::NoPages {
                manga_id: manga_id.to_string(),
                chapter_id: chapter.id,
            });
        }

        let navigation: Vec<_> = entry.chapters.iter().map(|c| c.summary()).collect();
        let previous = index
            .checked_sub(1)
            .and_then(|i| navigation.get(i))
            .cloned();
        let next = navigation.get(index + 1).cloned();

        Ok(ChapterView {
            manga: entry.info(),
            chapter,
            navigation,
            previous,
            next,
        })
    }
}

/// Scans every manga under `root` with the default configuration.
pub async fn scan_catalog(root: impl Into<PathBuf>) -> Result<Catalog> {
    CatalogConfig::builder()
        .root_path(root.into())
        .build()?
        .scan_catalog()
        .await
}

/// Locates one chapter under `root` with the default configuration.
pub async fn locate_chapter(
    root: impl Into<PathBuf>,
    manga_id: &str,
    chapter_number: f64,
) -> Result<ChapterView> {
    CatalogConfig::builder()
        .root_path(root.into())
        .build()?
        .locate_chapter(manga_id, chapter_number)
        .await
}

async fn find_manga_folder(collector: &Collector, manga_id: &str) -> Result<PathBuf> {
    if manga_id.is_empty() {
        return Err(Error::MangaNotFound(manga_id.to_string()));
    }

    let mut candidates = collector
        .collect_manga_folders()
        .await?
        .into_iter()
        .filter(|folder| parser::manga_id(&get_file_name_lossy(folder)) == manga_id);

    let folder = candidates
        .next()
        .ok_or_else(|| Error::MangaNotFound(manga_id.to_string()))?;
    if let Some(other) = candidates.next() {
        log::warn!(
            "Manga id '{}' matches both {:?} and {:?}, using the first",
            manga_id,
            folder,
            other
        );
    }
    Ok(folder)
}

fn build_entry(scan: MangaScan, provider: &dyn MetadataProvider) -> CatalogEntry {
    let id = parser::manga_id(&scan.folder_name);
    let title = parser::manga_title(&scan.folder_name);
    let metadata = provider.metadata(&id, &title, scan.chapters.len());
    let cover_url = scan
        .chapters
        .iter()
        .find_map(|chapter| chapter.pages.first().cloned());

    CatalogEntry {
        id,
        title,
        folder_name: scan.folder_name,
        has_volumes: scan.has_volumes,
        volumes: scan.has_volumes.then_some(scan.volumes),
        chapters: scan.chapters,
        cover_url,
        metadata,
    }
}

impl CatalogConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(base) = &self.public_base_path {
            let valid = base.starts_with('/')
                || base.starts_with("http://")
                || base.starts_with("https://");
            if !valid {
                return Err(format!("Invalid public_base_path: {}", base));
            }
        }

        if let Some(extensions) = &self.image_extensions {
            if extensions.is_empty() {
                return Err("image_extensions must not be empty.".to_string());
            }
            if extensions
                .iter()
                .any(|ext| ext.trim_start_matches('.').is_empty())
            {
                return Err(format!("Invalid image_extensions: {:?}", extensions));
            }
        }

        if let Some(0) = self.max_concurrent_scans {
            return Err("max_concurrent_scans must be at least 1.".to_string());
        }

        Ok(())
    }
}
