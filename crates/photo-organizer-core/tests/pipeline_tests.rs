mod common;

use common::*;
use photo_organizer_core::{Config, DateOrder, DateRange, Error, NamingFormat, PhotoOrganizer};
use std::path::Path;
use tempfile::tempdir;

fn organizer_for(base: &Path) -> PhotoOrganizer {
    let mut config = Config::with_base_dir(base);
    config.naming_format = NamingFormat::Iso;
    config.date_order = DateOrder::OldestFirst;
    config.download.delay_ms = 0;
    PhotoOrganizer::new(config)
}

fn write_url_file(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.join("urls.txt");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn sorted_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_empty_url_list_halts_before_filter() {
    let dir = tempdir().unwrap();
    let organizer = organizer_for(dir.path());
    let url_file = write_url_file(dir.path(), &["", "   "]);

    let report = organizer
        .run_with(FakeWeb::new(), &url_file, None)
        .unwrap();

    let summary = report.download.unwrap();
    assert_eq!(summary.attempted(), 0);
    assert_eq!(summary.succeeded(), 0);
    assert_eq!(summary.failed(), 0);
    assert!(report.partition.is_none());
    assert!(report.organize.is_none());
    assert!(!organizer.config().organized_dir.exists());
}

#[test]
fn test_all_failed_downloads_still_report_the_summary() {
    let dir = tempdir().unwrap();
    let organizer = organizer_for(dir.path());
    let web = FakeWeb::new()
        .missing("https://photos.test/a.png")
        .missing("https://photos.test/b.png");
    let url_file = write_url_file(
        dir.path(),
        &["https://photos.test/a.png", "https://photos.test/b.png"],
    );

    let report = organizer.run_with(web, &url_file, None).unwrap();

    let summary = report.download.unwrap();
    assert_eq!(summary.attempted(), 2);
    assert_eq!(summary.succeeded(), 0);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.failures().count(), 2);

    assert_eq!(report.partition.unwrap().total(), 0);
    assert!(report.organize.is_none());
    assert!(sorted_entries(&organizer.config().organized_dir).is_empty());
}

#[test]
fn test_only_thumbnails_stops_after_filter() {
    let dir = tempdir().unwrap();
    let organizer = organizer_for(dir.path());
    let raw = &organizer.config().download_dir;
    std::fs::create_dir_all(raw).unwrap();
    create_test_image(raw, "photo_0001.png", 20, 20, 1);
    create_test_image(raw, "photo_0002.png", 30, 30, 2);

    let range = DateRange::parse("2024-01-01", "2024-01-02").unwrap();
    let report = organizer.organize_staged(Some(&range)).unwrap();

    assert_eq!(report.partition.unwrap().thumbnails.len(), 2);
    assert!(report.organize.is_none());
    assert_eq!(
        sorted_entries(&organizer.config().thumbnails_dir),
        vec!["photo_0001.png", "photo_0002.png"]
    );
}

#[test]
fn test_second_run_keeps_first_batch_raw_files() {
    let dir = tempdir().unwrap();
    let organizer = organizer_for(dir.path());

    let first_list = write_url_file(dir.path(), &["https://photos.test/a.png"]);
    let first = FakeWeb::new().image("https://photos.test/a.png", png_bytes(640, 480, 1));
    organizer.run_with(first, &first_list, None).unwrap();

    let second_list = write_url_file(dir.path(), &["https://photos.test/b.png"]);
    let second = FakeWeb::new().image("https://photos.test/b.png", png_bytes(640, 480, 2));
    let report = organizer.run_with(second, &second_list, None).unwrap();

    let raw = &organizer.config().download_dir;
    assert_eq!(sorted_entries(raw), vec!["photo_0001.png", "photo_0002.png"]);
    assert_eq!(std::fs::read(raw.join("photo_0001.png")).unwrap(), png_bytes(640, 480, 1));

    let organized = report.organize.unwrap();
    assert_eq!(organized.organized.len(), 1);
    assert_eq!(organized.already_present.len(), 1);
}

#[test]
fn test_full_run_on_a_single_day() {
    let dir = tempdir().unwrap();
    let organizer = organizer_for(dir.path());

    let web = FakeWeb::new()
        .image("https://photos.test/a.png", png_bytes(640, 480, 1))
        .image("https://photos.test/b.png", png_bytes(640, 480, 2))
        .image("https://photos.test/b-again.png", png_bytes(640, 480, 2))
        .image("https://photos.test/tiny.png", png_bytes(32, 32, 3))
        .missing("https://photos.test/gone.png")
        .image("https://photos.test/c.png", png_bytes(640, 480, 4));

    let url_file = write_url_file(
        dir.path(),
        &[
            "https://photos.test/a.png",
            "not-a-url",
            "https://photos.test/b.png",
            "https://photos.test/b-again.png",
            "",
            "https://photos.test/tiny.png",
            "https://photos.test/gone.png",
            "https://photos.test/c.png",
            "https://photos.test/a.png",
        ],
    );

    let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
    let report = organizer.run_with(web, &url_file, Some(&range)).unwrap();

    let summary = report.download.unwrap();
    assert_eq!(summary.attempted(), 6);
    assert_eq!(summary.succeeded(), 5);
    assert_eq!(summary.failed(), 1);

    let partition = report.partition.unwrap();
    assert_eq!(partition.unique.len(), 3);
    assert_eq!(partition.thumbnails.len(), 1);
    assert_eq!(partition.duplicates.len(), 1);

    let config = organizer.config();
    assert_eq!(
        sorted_entries(&config.organized_dir),
        vec!["2024-01-01a.png", "2024-01-01b.png", "2024-01-01c.png"]
    );
    // a, b, c in capture order
    assert_eq!(
        std::fs::read(config.organized_dir.join("2024-01-01c.png")).unwrap(),
        png_bytes(640, 480, 4)
    );

    // Raw originals stay put; siphoned files keep their staged names
    assert_eq!(
        sorted_entries(&config.download_dir),
        vec!["photo_0001.png", "photo_0002.png", "photo_0006.png"]
    );
    assert_eq!(sorted_entries(&config.thumbnails_dir), vec!["photo_0004.png"]);
    assert_eq!(sorted_entries(&config.duplicates_dir), vec!["photo_0003.png"]);
}

#[test]
fn test_inverted_range_renames_nothing() {
    let dir = tempdir().unwrap();
    let organizer = organizer_for(dir.path());
    create_mixed_staging(&organizer.config().download_dir);

    let range = DateRange::parse("2024-03-10", "2024-03-01");
    assert!(matches!(range, Err(Error::Validation(_))));

    // The sequencer refuses an empty photo set as well
    assert!(matches!(
        organizer.sequence(Vec::new(), None),
        Err(Error::Validation(_))
    ));
    assert!(!organizer.config().organized_dir.exists());
}

#[test]
fn test_organize_staged_twice_is_stable() {
    let dir = tempdir().unwrap();
    let organizer = organizer_for(dir.path());
    create_mixed_staging(&organizer.config().download_dir);
    let range = DateRange::parse("2024-06-01", "2024-06-30").unwrap();

    let first = organizer.organize_staged(Some(&range)).unwrap();
    let second = organizer.organize_staged(Some(&range)).unwrap();

    let first_org = first.organize.unwrap();
    let second_org = second.organize.unwrap();
    assert_eq!(first_org.organized.len(), 3);
    assert!(second_org.organized.is_empty());
    assert_eq!(second_org.already_present, first_org.organized);
    assert_eq!(
        sorted_entries(&organizer.config().organized_dir),
        vec!["2024-06-01a.png", "2024-06-15a.png", "2024-06-30a.png"]
    );
}

#[test]
fn test_undated_organize() {
    let dir = tempdir().unwrap();
    let organizer = organizer_for(dir.path());
    create_mixed_staging(&organizer.config().download_dir);

    let report = organizer.organize_staged(None).unwrap();
    assert!(report.organize.unwrap().is_clean());
    assert_eq!(
        sorted_entries(&organizer.config().organized_dir),
        vec!["photo_0001.png", "photo_0002.png", "photo_0003.png"]
    );
}
