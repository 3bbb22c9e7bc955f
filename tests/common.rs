//! Common test utilities and constants for the Hondana crate.
//!
//! Provides functions for setting up test directories, creating dummy page files,
//! and building configs over disk or in-memory sources.

use hondana::error::Result;
use hondana::prelude::*;
use rand::{Rng, distributions::Alphanumeric};
use std::time::Duration;
use tokio::fs;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";
#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Paths of a freshly created test directory.
#[allow(dead_code)]
pub struct TestDirs {
    pub test_dir: PathBuf,
    pub root_dir: PathBuf,
}

/// Creates a clean, uniquely named test directory with an empty catalog root inside.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let unique_sub_path = format!("{}-{}", sub_path, rand_string);
    let test_dir = PathBuf::from(TEST_TMP_DIR).join(unique_sub_path);
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).await.unwrap();
    }
    let root_dir = test_dir.join("root");
    fs::create_dir_all(&root_dir).await.unwrap();

    TestDirs { test_dir, root_dir }
}

/// Writes a small placeholder file, creating parent directories as needed.
///
/// The catalog only looks at names, so the bytes do not need to be a real image.
#[allow(dead_code)]
pub async fn create_dummy_page(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, b"\xFF\xD8\xFF\xE0hondana").await?;
    Ok(())
}

/// Creates several pages in one chapter folder.
#[allow(dead_code)]
pub async fn create_chapter(dir: &Path, pages: &[&str]) -> Result<()> {
    fs::create_dir_all(dir).await?;
    for page in pages {
        create_dummy_page(&dir.join(page)).await?;
    }
    Ok(())
}

/// Builds a config over the given disk root.
#[allow(dead_code)]
pub fn disk_config(root: &Path) -> Result<CatalogConfig> {
    Ok(CatalogConfig::builder().root_path(root).build()?)
}

/// Builds a config over an in-memory tree.
#[allow(dead_code)]
pub fn memory_config(source: MemorySource) -> Result<CatalogConfig> {
    let source: Arc<dyn CatalogSource> = Arc::new(source);
    Ok(CatalogConfig::builder().source(source).build()?)
}
