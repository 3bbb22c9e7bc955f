//! Custom error types and result handling for Hondana operations.
//!
//! All operations return a [`Result<T>`] which is a type alias for `std::result::Result<T, Error>`.
//!
//! Malformed folder names are never errors: the parser falls back to positional
//! numbering instead. The only user-facing failures are the "requested entity does
//! not exist" kinds, grouped by [`Error::is_not_found`].
use std::path::PathBuf;

/// Type alias for Results with Hondana errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Hondana operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON serialization errors (import batches)
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Async task join errors
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Semaphore(#[from] tokio::sync::AcquireError),
    #[error(transparent)]
    ConfigBuilder(#[from] crate::catalog::CatalogConfigBuilderError),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// No manga folder derives the requested id
    #[error("Manga not found: {0}")]
    MangaNotFound(String),
    /// The manga exists but no chapter parses to the requested number
    #[error("Chapter {chapter_number} not found in manga '{manga_id}'")]
    ChapterNotFound { manga_id: String, chapter_number: f64 },
    /// The chapter was listed but its folder could not be read back
    #[error("Chapter folder not found: {0:?}")]
    ChapterFolderNotFound(PathBuf),
    /// The chapter folder holds no recognized page images
    #[error("No pages found for chapter '{chapter_id}' in manga '{manga_id}'")]
    NoPages { manga_id: String, chapter_id: String },
    /// Two chapter folders parse to the same number within one manga
    #[error("Duplicate chapter {chapter_number} in manga '{manga_id}'")]
    DuplicateChapter {
        manga_id: String,
        volume_number: Option<u32>,
        chapter_number: f64,
    },
    /// A requested chapter number is not numeric
    #[error("Invalid chapter number: {0:?}")]
    InvalidChapterNumber(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Returns true for the errors an HTTP layer should answer with a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::MangaNotFound(_)
                | Error::ChapterNotFound { .. }
                | Error::ChapterFolderNotFound(_)
                | Error::NoPages { .. }
        )
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
