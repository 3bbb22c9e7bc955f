//! Hondana - Manga Folder Catalog Library
//!
//! This crate turns a directory of manga folders into a normalized reading catalog:
//! stable manga ids and titles, optional volume groupings, chapters parsed from
//! hand-named folders, and ordered page URLs that a static file server can answer.
//!
//! # Folder layout
//!
//! ```text
//! root/
//! ├── attack-on-titan/
//! │   └── volumes/
//! │       └── Volume 1 - Arrival/
//! │           └── chapters/
//! │               └── 1 - To You, 2000 Years From Now/
//! │                   ├── 1.jpg
//! │                   └── 2.jpg
//! └── berserk/
//!     └── chapters/
//!         └── 1 - The Black Swordsman/
//!             └── 01.png
//! ```
//!
//! # Getting Started
//!
//! ```rust,no_run
//! use hondana::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> hondana::error::Result<()> {
//!     let config = CatalogConfig::builder()
//!         .root_path("./public/manga")
//!         .public_base_path("/manga")
//!         .build()?;
//!
//!     let catalog = config.scan_catalog().await?;
//!     for manga in &catalog.manga {
//!         println!("{} ({} chapters)", manga.title, manga.chapters.len());
//!     }
//!
//!     let view = config.locate_chapter("attackontitan", 1.0).await?;
//!     println!("{}: {:?}", view.chapter.title, view.chapter.pages);
//!     Ok(())
//! }
//! ```
//!
//! The catalog is rebuilt on every call; nothing is cached between reads.

pub mod catalog;
pub mod collector;
pub mod error;
pub mod import;
pub mod metadata;
pub mod parser;
pub mod path_utils;
pub mod source;
pub mod types;

pub use catalog::{CatalogConfig, CatalogConfigBuilder, locate_chapter, scan_catalog};

pub use types::{
    Catalog, CatalogEntry, Chapter, ChapterSummary, ChapterView, Layout, MangaInfo,
    MangaMetadata, MangaStatus, MangaSummary, PageOrder, ScanFinding, ScanReport, VolumeGroup,
};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and traits, allowing you to
/// import everything you need with a single `use hondana::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        Catalog, CatalogConfig, CatalogConfigBuilder, CatalogEntry, Chapter, ChapterSummary,
        ChapterView, Layout, MangaInfo, MangaMetadata, MangaStatus, MangaSummary, PageOrder,
        ScanFinding, ScanReport, VolumeGroup, error, types,
    };
    pub use crate::collector::{CollectMode, Collector};
    pub use crate::import::ImportBatch;
    pub use crate::metadata::{DefaultMetadata, MetadataProvider, StaticMetadata};
    pub use crate::source::{CatalogSource, FsSource, MemorySource};
    pub use std::path::{Path, PathBuf};
    pub use std::sync::Arc;
}
