//! Directory sources the catalog is scanned from.
//!
//! All paths exchanged with a [`CatalogSource`] are relative to the catalog root; the
//! empty path denotes the root itself. Listings skip hidden entries and are returned
//! sorted by name, so positional fallbacks do not depend on the platform's listing order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{ReadDir, metadata, read_dir};

use crate::error::{Error, Result};
use crate::path_utils::is_hidden_file;

/// Read-only view of a directory tree.
#[async_trait]
pub trait CatalogSource: Debug + Send + Sync {
    /// Lists the subdirectories of `dir`.
    async fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Lists the regular files of `dir`.
    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// True when `dir` exists and is a directory.
    async fn is_dir(&self, dir: &Path) -> bool;
}

/// A [`CatalogSource`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collects directory contents with filtering options
    ///
    /// # Arguments
    ///
    /// * `relative` - Directory to scan, relative to the root
    /// * `only_dirs` - When true, only directories are collected; when false, only files
    ///
    /// # Returns
    ///
    /// * `Result<Vec<PathBuf>>` - Root-relative paths meeting the criteria, sorted
    async fn collect_entries(&self, relative: &Path, only_dirs: bool) -> Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = Vec::new();

        let mut paths: ReadDir = read_dir(self.root.join(relative)).await?;

        while let Some(entry) = paths.next_entry().await? {
            let path = entry.path();

            if is_hidden_file(&path) {
                continue;
            }

            // Follows symlinks, unlike DirEntry::file_type
            let is_dir = match metadata(&path).await {
                Ok(meta) => meta.is_dir(),
                Err(e) => {
                    log::debug!("Skipping unreadable entry {:?}: {}", path, e);
                    continue;
                }
            };
            if only_dirs != is_dir {
                continue; // Just skip, don't return an error for mixed content
            }

            entries.push(relative.join(entry.file_name()));
        }

        entries.sort();
        Ok(entries)
    }
}

#[async_trait]
impl CatalogSource for FsSource {
    async fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.collect_entries(dir, true).await
    }

    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.collect_entries(dir, false).await
    }

    async fn is_dir(&self, dir: &Path) -> bool {
        metadata(self.root.join(dir))
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }
}

/// An in-memory directory tree, for tests and fixtures.
///
/// ```rust
/// use hondana::source::MemorySource;
///
/// let source = MemorySource::new()
///     .with_file("berserk/chapters/1 - The Black Swordsman/01.jpg")
///     .with_file("berserk/chapters/1 - The Black Swordsman/02.jpg");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    dirs: BTreeSet<PathBuf>,
    files: BTreeSet<PathBuf>,
    failures: BTreeMap<PathBuf, ErrorKind>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating every missing parent directory.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        self.files.insert(path);
        self
    }

    /// Adds an (possibly empty) directory and its parents.
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.insert_dirs(&path);
        self
    }

    /// Makes every listing of `path` fail with the given error kind.
    pub fn with_failure(mut self, path: impl Into<PathBuf>, kind: ErrorKind) -> Self {
        self.failures.insert(path.into(), kind);
        self
    }

    fn insert_dirs(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn check(&self, dir: &Path) -> Result<()> {
        if let Some(kind) = self.failures.get(dir) {
            return Err(Error::Io(std::io::Error::new(
                *kind,
                format!("listing {:?} failed", dir),
            )));
        }
        if !dir.as_os_str().is_empty() && !self.dirs.contains(dir) {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("{:?} does not exist", dir),
            )));
        }
        Ok(())
    }

    fn children<'a>(
        &'a self,
        set: &'a BTreeSet<PathBuf>,
        dir: &'a Path,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        set.iter()
            .filter(move |p| p.parent() == Some(dir) && !is_hidden_file(p))
            .cloned()
    }
}

#[async_trait]
impl CatalogSource for MemorySource {
    async fn list_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.check(dir)?;
        Ok(self.children(&self.dirs, dir).collect())
    }

    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.check(dir)?;
        Ok(self.children(&self.files, dir).collect())
    }

    async fn is_dir(&self, dir: &Path) -> bool {
        dir.as_os_str().is_empty() || self.dirs.contains(dir)
    }
}
