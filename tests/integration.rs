//! Integration tests for the Hondana crate.
//!
//! These tests build real folder trees on disk and run full scans and chapter lookups
//! against them.

use hondana::error::{Error, Result};
use hondana::prelude::*;
use tokio::time::timeout;

mod common;
use common::{TEST_TIMEOUT, create_chapter, create_dummy_page, disk_config, setup_test_dirs};

#[tokio::test]
async fn test_locate_chapter_in_volume_layout() -> Result<()> {
    let test_dirs = setup_test_dirs("locate_volume_layout").await;
    let chapter_dir = test_dirs
        .root_dir
        .join("attack-on-titan")
        .join("volumes")
        .join("Volume 1 - Arrival")
        .join("chapters")
        .join("1 - To You, 2000 Years From Now");
    create_chapter(&chapter_dir, &["1.jpg", "2.jpg"]).await?;

    let view = timeout(
        TEST_TIMEOUT,
        hondana::locate_chapter(test_dirs.root_dir.clone(), "attackontitan", 1.0),
    )
    .await
    .expect("Test timed out")?;

    let chapter = &view.chapter;
    assert_eq!(chapter.title, "To You, 2000 Years From Now");
    assert_eq!(chapter.volume_number, Some(1));
    assert_eq!(chapter.volume_title.as_deref(), Some("Volume 1 - Arrival"));
    assert_eq!(chapter.id, "attack-on-titan-vol1-chapter-1");
    assert_eq!(chapter.pages.len(), 2);
    assert!(chapter.pages[0].ends_with("1.jpg"));
    assert!(chapter.pages[1].ends_with("2.jpg"));
    assert_eq!(
        chapter.pages[0],
        "/manga/attack-on-titan/volumes/Volume%201%20-%20Arrival/chapters/1%20-%20To%20You%2C%202000%20Years%20From%20Now/1.jpg"
    );

    assert_eq!(view.manga.id, "attackontitan");
    assert_eq!(view.manga.title, "Attack On Titan");
    assert!(view.manga.has_volumes);
    assert_eq!(view.navigation.len(), 1);
    assert!(view.previous.is_none() && view.next.is_none());
    Ok(())
}

#[tokio::test]
async fn test_page_filtering_on_disk() -> Result<()> {
    let test_dirs = setup_test_dirs("page_filtering").await;
    let chapter_dir = test_dirs.root_dir.join("berserk").join("chapters").join("1");
    create_chapter(
        &chapter_dir,
        &["1.jpg", "2.png", "notes.txt", "cover.PSD", ".thumb.jpg"],
    )
    .await?;
    // A nested folder inside a chapter is not a page
    tokio::fs::create_dir_all(chapter_dir.join("raw.jpg")).await?;

    let config = disk_config(&test_dirs.root_dir)?;
    let view = config.locate_chapter_str("berserk", "1").await?;
    assert_eq!(
        view.chapter.pages,
        vec![
            "/manga/berserk/chapters/1/1.jpg".to_string(),
            "/manga/berserk/chapters/1/2.png".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_empty_chapter_is_listed_but_not_readable() -> Result<()> {
    let test_dirs = setup_test_dirs("empty_chapter").await;
    let chapters = test_dirs.root_dir.join("vagabond").join("chapters");
    create_chapter(&chapters.join("1 - Takezo"), &["01.jpg"]).await?;
    create_chapter(&chapters.join("2 - Empty"), &["readme.txt"]).await?;

    let config = disk_config(&test_dirs.root_dir)?;
    let catalog = config.scan_catalog().await?;
    let vagabond = catalog.get("vagabond").unwrap();
    assert_eq!(vagabond.chapters.len(), 2);
    assert!(vagabond.chapters[1].pages.is_empty());
    assert!(catalog.report.findings.contains(&ScanFinding::EmptyChapter {
        manga_id: "vagabond".to_string(),
        chapter_id: "vagabond-chapter-2".to_string(),
    }));

    let result = config.locate_chapter("vagabond", 2.0).await;
    match result {
        Err(err @ Error::NoPages { .. }) => assert!(err.is_not_found()),
        other => panic!("expected NoPages, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_natural_page_order_on_disk() -> Result<()> {
    let test_dirs = setup_test_dirs("natural_order").await;
    let chapter_dir = test_dirs.root_dir.join("m").join("chapters").join("1");
    create_chapter(&chapter_dir, &["1.jpg", "2.jpg", "10.jpg"]).await?;

    let lexicographic = disk_config(&test_dirs.root_dir)?
        .locate_chapter("m", 1.0)
        .await?;
    assert!(lexicographic.chapter.pages[1].ends_with("/10.jpg"));

    let natural = CatalogConfig::builder()
        .root_path(test_dirs.root_dir.clone())
        .page_order(PageOrder::Natural)
        .build()?
        .locate_chapter("m", 1.0)
        .await?;
    assert!(natural.chapter.pages[1].ends_with("/2.jpg"));
    assert!(natural.chapter.pages[2].ends_with("/10.jpg"));
    Ok(())
}

#[tokio::test]
async fn test_navigation_neighbours() -> Result<()> {
    let test_dirs = setup_test_dirs("navigation").await;
    let chapters = test_dirs.root_dir.join("blame").join("chapters");
    for name in ["1 - Net Sphere", "2 - Silicon Life", "2.5 - Extra", "3 - Cibo"] {
        create_dummy_page(&chapters.join(name).join("01.jpg")).await?;
    }

    let config = disk_config(&test_dirs.root_dir)?;
    let view = config.locate_chapter("blame", 2.5).await?;
    assert_eq!(view.chapter.title, "Extra");
    assert_eq!(view.previous.as_ref().map(|c| c.chapter_number), Some(2.0));
    assert_eq!(view.next.as_ref().map(|c| c.chapter_number), Some(3.0));
    let titles: Vec<&str> = view.navigation.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Net Sphere", "Silicon Life", "Extra", "Cibo"]);
    Ok(())
}

#[tokio::test]
async fn test_scan_catalog_free_function_and_json_shape() -> Result<()> {
    let test_dirs = setup_test_dirs("catalog_json").await;
    create_dummy_page(
        &test_dirs
            .root_dir
            .join("dr-stone")
            .join("volumes")
            .join("Vol 1")
            .join("chapters")
            .join("1 - Z=1")
            .join("001.webp"),
    )
    .await?;
    create_dummy_page(&test_dirs.root_dir.join(".cache").join("chapters").join("1").join("1.jpg"))
        .await?;

    let catalog = hondana::scan_catalog(test_dirs.root_dir.clone()).await?;
    assert_eq!(catalog.manga.len(), 1, "hidden folders are not manga");

    let json = serde_json::to_value(&catalog.manga[0]).unwrap();
    assert_eq!(json["id"], "drstone");
    assert_eq!(json["title"], "Dr Stone");
    assert_eq!(json["hasVolumes"], true);
    assert_eq!(json["volumes"][0]["volumeNumber"], 1);
    assert_eq!(json["volumes"][0]["volumeTitle"], "Vol 1");
    assert_eq!(json["chapters"][0]["chapterNumber"], 1.0);
    assert_eq!(json["chapters"][0]["title"], "Z=1");
    assert_eq!(json["status"], "ongoing");
    assert_eq!(
        json["chapters"][0]["pages"][0],
        "/manga/dr-stone/volumes/Vol%201/chapters/1%20-%20Z%3D1/001.webp"
    );
    Ok(())
}

#[tokio::test]
async fn test_import_batch_from_disk_catalog() -> Result<()> {
    let test_dirs = setup_test_dirs("import_batch").await;
    let chapters = test_dirs.root_dir.join("monster").join("chapters");
    create_chapter(&chapters.join("1 - Herr Dr. Tenma"), &["01.jpg", "02.jpg"]).await?;
    create_chapter(&chapters.join("2 - Night of the Execution"), &["01.jpg"]).await?;
    tokio::fs::create_dir_all(chapters.join("3 - Unfinished")).await?;

    let catalog = disk_config(&test_dirs.root_dir)?.scan_catalog().await?;
    let batch = ImportBatch::from_catalog(&catalog)?;

    assert_eq!(batch.manga.len(), 1);
    assert_eq!(batch.manga[0].id, "monster");
    assert_eq!(batch.manga[0].chapter_count, 2);
    assert_eq!(batch.chapters.len(), 2);
    assert_eq!(batch.skipped_empty_chapters, 1);
    assert_eq!(batch.chapters[0].manga_id, "monster");
    assert_eq!(batch.chapters[0].page_count, 2);

    let json = batch.to_json_pretty()?;
    assert!(json.contains("\"mangaId\": \"monster\""));
    assert!(json.contains("\"skippedEmptyChapters\": 1"));
    Ok(())
}

#[tokio::test]
async fn test_import_batch_rejects_duplicate_chapters() -> Result<()> {
    let test_dirs = setup_test_dirs("import_duplicates").await;
    let chapters = test_dirs.root_dir.join("pluto").join("chapters");
    create_chapter(&chapters.join("1 - Mont Blanc"), &["01.jpg"]).await?;
    create_chapter(&chapters.join("001 - Mont Blanc (HQ)"), &["01.jpg"]).await?;

    let catalog = disk_config(&test_dirs.root_dir)?.scan_catalog().await?;
    assert_eq!(catalog.report.duplicate_chapters().count(), 1);

    let result = ImportBatch::from_catalog(&catalog);
    assert!(matches!(
        result,
        Err(Error::DuplicateChapter { ref manga_id, .. }) if manga_id == "pluto"
    ));
    Ok(())
}

#[tokio::test]
async fn test_import_batch_keeps_first_folder_for_shared_manga_id() -> Result<()> {
    let test_dirs = setup_test_dirs("import_shared_id").await;
    create_chapter(
        &test_dirs.root_dir.join("one-piece").join("chapters").join("1"),
        &["01.jpg"],
    )
    .await?;
    create_chapter(
        &test_dirs.root_dir.join("one_piece").join("chapters").join("1"),
        &["01.jpg"],
    )
    .await?;

    let catalog = disk_config(&test_dirs.root_dir)?.scan_catalog().await?;
    assert_eq!(catalog.manga.len(), 2);

    let batch = ImportBatch::from_catalog(&catalog)?;
    let manga_ids: Vec<&str> = batch.manga.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(manga_ids, vec!["onepiece"]);
    assert_eq!(batch.manga[0].folder_name, "one-piece");
    assert_eq!(batch.skipped_duplicate_manga, 1);

    let chapter_ids: Vec<&str> = batch.chapters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(chapter_ids, vec!["one-piece-chapter-1"]);
    Ok(())
}

#[tokio::test]
async fn test_rescan_reflects_folder_changes() -> Result<()> {
    let test_dirs = setup_test_dirs("rescan").await;
    let chapters = test_dirs.root_dir.join("akira").join("chapters");
    create_chapter(&chapters.join("1"), &["01.jpg"]).await?;

    let config = disk_config(&test_dirs.root_dir)?;
    assert_eq!(config.scan_manga("akira").await?.chapters.len(), 1);

    create_chapter(&chapters.join("2"), &["01.jpg"]).await?;
    assert_eq!(config.scan_manga("akira").await?.chapters.len(), 2);
    Ok(())
}
