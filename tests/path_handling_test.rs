//! Tests for path handling with unusual folder names: spaces, punctuation, non-ASCII
//! characters, and names that carry no usable numbers.

use hondana::error::Result;
use hondana::path_utils::*;
use hondana::prelude::*;

mod common;
use common::{create_chapter, disk_config, setup_test_dirs};

#[test]
fn test_get_file_name_lossy() {
    let path = Path::new("folder/test_file.jpg");
    assert_eq!(get_file_name_lossy(path), "test_file.jpg");
    assert_eq!(get_file_name_lossy(Path::new("")), "unknown");
}

#[test]
fn test_url_segments_skip_non_normal_components() {
    let segments = url_segments(Path::new("./manga/chapters/1/01.jpg"));
    assert_eq!(segments, vec!["manga", "chapters", "1", "01.jpg"]);
}

#[test]
fn test_public_url_with_reserved_characters() {
    let cases = [
        ("a b", "a%20b"),
        ("a#b", "a%23b"),
        ("a?b", "a%3Fb"),
        ("a%b", "a%25b"),
        ("a&b", "a%26b"),
        ("a+b", "a%2Bb"),
    ];
    for (raw, encoded) in cases {
        let url = public_url("/manga", &Path::new(raw).join("01.jpg"));
        assert_eq!(url, format!("/manga/{}/01.jpg", encoded));
    }
}

#[tokio::test]
async fn test_non_ascii_folder_names_on_disk() -> Result<()> {
    let test_dirs = setup_test_dirs("non_ascii").await;
    let chapter_dir = test_dirs
        .root_dir
        .join("進撃の巨人-shingeki")
        .join("chapters")
        .join("1 - 二千年後の君へ");
    create_chapter(&chapter_dir, &["01.jpg"]).await?;

    let config = disk_config(&test_dirs.root_dir)?;
    let catalog = config.scan_catalog().await?;
    let entry = &catalog.manga[0];

    // Non-ASCII letters are dropped from the id but kept in the title
    assert_eq!(entry.id, "shingeki");
    assert_eq!(entry.title, "進撃の巨人 Shingeki");
    assert_eq!(entry.chapters[0].title, "二千年後の君へ");

    let page = &entry.chapters[0].pages[0];
    assert!(page.starts_with("/manga/%E9%80%B2"));
    assert!(page.is_ascii());

    let view = config.locate_chapter("shingeki", 1.0).await?;
    assert_eq!(view.chapter.pages, entry.chapters[0].pages);
    Ok(())
}

#[tokio::test]
async fn test_unnumbered_chapter_folders_fall_back_to_position() -> Result<()> {
    let test_dirs = setup_test_dirs("unnumbered").await;
    let chapters = test_dirs.root_dir.join("hellsing").join("chapters");
    create_chapter(&chapters.join("A - Prologue"), &["01.jpg"]).await?;
    create_chapter(&chapters.join("B - Middle"), &["01.jpg"]).await?;
    create_chapter(&chapters.join("Extra Story"), &["01.jpg"]).await?;

    let config = disk_config(&test_dirs.root_dir)?;
    let entry = config.scan_manga("hellsing").await?;
    let numbers: Vec<(f64, &str)> = entry
        .chapters
        .iter()
        .map(|c| (c.chapter_number, c.title.as_str()))
        .collect();
    assert_eq!(
        numbers,
        vec![
            (1.0, "A - Prologue"),
            (2.0, "B - Middle"),
            (3.0, "Extra Story"),
        ]
    );

    let view = config.locate_chapter("hellsing", 3.0).await?;
    assert_eq!(view.chapter.title, "Extra Story");
    Ok(())
}
