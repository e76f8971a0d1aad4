//! Integration tests for unnest-core.
//!
//! These tests run whole extractions and recursive scans against real
//! directory trees.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use chrono::TimeZone;
use filetime::FileTime;
use tempfile::TempDir;
use unnest_core::ChannelSink;
use unnest_core::ExtractConfig;
use unnest_core::ExtractionError;
use unnest_core::ExtractionOutcome;
use unnest_core::ExtractionWorker;
use unnest_core::LogCategory;
use unnest_core::MemorySink;
use unnest_core::PassSummary;
use unnest_core::extract_archive;
use unnest_core::recursive_extract;
use unnest_core::resolve_scan_root;
use unnest_core::test_utils::RawZipBuilder;
use unnest_core::test_utils::TarTestBuilder;
use unnest_core::test_utils::ZipTestBuilder;
use unnest_core::test_utils::create_test_zip;

fn write(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, data).unwrap();
}

fn extracted_per_pass(passes: &[PassSummary]) -> Vec<usize> {
    passes.iter().map(|pass| pass.extracted).collect()
}

#[test]
fn test_flat_zip_and_wrapped_tar_gz() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        &root.join("a.zip"),
        &create_test_zip(vec![("x.txt", b"x"), ("y.txt", b"y")]),
    );
    write(
        &root.join("b.tar.gz"),
        &TarTestBuilder::new()
            .add_directory("b/")
            .add_file("b/z.txt", b"z")
            .build_gz(),
    );
    let sink = MemorySink::new();

    let report = recursive_extract(root, &sink, &ExtractConfig::default()).unwrap();

    assert_eq!(fs::read(root.join("a/x.txt")).unwrap(), b"x");
    assert_eq!(fs::read(root.join("a/y.txt")).unwrap(), b"y");
    assert_eq!(fs::read(root.join("b/z.txt")).unwrap(), b"z");
    assert!(!root.join("b/b").exists());
    assert!(root.join("a.zip").exists());
    assert!(root.join("b.tar.gz").exists());

    assert_eq!(extracted_per_pass(&report.passes), vec![2, 0]);
    assert_eq!(report.extracted, 2);
    assert_eq!(report.failed, 0);
    // Second pass saw both archives again, their targets now existing
    assert_eq!(report.skipped_existing, 2);

    let success = sink.messages(LogCategory::Success);
    assert!(success.contains(&format!("Extracted: {}", root.join("a.zip").display())));
    assert!(success.contains(&format!("Extracted: {}", root.join("b.tar.gz").display())));
    assert_eq!(success.last().unwrap(), "All archives extracted");
}

#[test]
fn test_nested_archives_reach_fixpoint() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let inner = create_test_zip(vec![("data.txt", b"deep data")]);
    let outer = TarTestBuilder::new().add_file("inner.zip", &inner).build_gz();
    write(&root.join("outer.tar.gz"), &outer);
    let sink = MemorySink::new();

    let report = recursive_extract(root, &sink, &ExtractConfig::default()).unwrap();

    assert_eq!(extracted_per_pass(&report.passes), vec![1, 1, 0]);
    assert!(report.reached_fixpoint());
    assert_eq!(
        fs::read(root.join("outer/inner/data.txt")).unwrap(),
        b"deep data"
    );
    assert_eq!(
        sink.messages(LogCategory::Info),
        vec![
            "Pass 1: 1 archive(s) extracted".to_string(),
            "Pass 2: 1 archive(s) extracted".to_string(),
            "Pass 3: 0 archive(s) extracted".to_string(),
        ]
    );
}

#[test]
fn test_nested_archives_with_deletion() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let inner = create_test_zip(vec![("data.txt", b"deep data")]);
    write(
        &root.join("outer.tar.gz"),
        &TarTestBuilder::new().add_file("inner.zip", &inner).build_gz(),
    );

    let config = ExtractConfig::default().with_delete_after(true);
    let report = recursive_extract(root, &MemorySink::new(), &config).unwrap();

    assert_eq!(report.sources_deleted, 2);
    assert!(!root.join("outer.tar.gz").exists());
    assert!(!root.join("outer/inner.zip").exists());
    assert!(root.join("outer/inner/data.txt").is_file());
    let top: Vec<_> = fs::read_dir(root).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(top, vec![std::ffi::OsString::from("outer")]);
}

#[test]
fn test_idempotent_extraction() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("twice.zip");
    write(&path, &create_test_zip(vec![("f.txt", b"original")]));

    let first = extract_archive(&path, &MemorySink::new(), &ExtractConfig::default());
    assert!(first.is_extracted());

    fs::write(temp.path().join("twice/f.txt"), b"edited").unwrap();
    let sink = MemorySink::new();
    let second = extract_archive(&path, &sink, &ExtractConfig::default());

    assert!(matches!(second, ExtractionOutcome::SkippedExists));
    assert!(sink.events().is_empty());
    assert_eq!(fs::read(temp.path().join("twice/f.txt")).unwrap(), b"edited");
}

#[test]
fn test_rerun_extracts_nothing() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("once.zip"),
        &create_test_zip(vec![("f.txt", b"f")]),
    );

    recursive_extract(temp.path(), &MemorySink::new(), &ExtractConfig::default()).unwrap();
    let again =
        recursive_extract(temp.path(), &MemorySink::new(), &ExtractConfig::default()).unwrap();

    assert_eq!(extracted_per_pass(&again.passes), vec![0]);
    assert_eq!(again.skipped_existing, 1);
}

#[test]
fn test_case_insensitive_suffixes() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("UPPER.ZIP"), &create_test_zip(vec![("u.txt", b"u")]));
    write(
        &root.join("Mixed.Tar.Gz"),
        &TarTestBuilder::new().add_file("m.txt", b"m").build_gz(),
    );
    write(
        &root.join("short.TGZ"),
        &TarTestBuilder::new().add_file("s.txt", b"s").build_gz(),
    );
    write(
        &root.join("plain.tar"),
        &TarTestBuilder::new().add_file("p.txt", b"p").build(),
    );

    let report = recursive_extract(root, &MemorySink::new(), &ExtractConfig::default()).unwrap();

    assert_eq!(report.extracted, 4);
    assert!(root.join("UPPER/u.txt").is_file());
    assert!(root.join("Mixed/m.txt").is_file());
    assert!(root.join("short/s.txt").is_file());
    assert!(root.join("plain/p.txt").is_file());
}

#[test]
fn test_corrupt_archive_cleaned_up_and_run_continues() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("bad.zip"), b"PK\x03\x04 but not really a zip");
    write(&root.join("good.zip"), &create_test_zip(vec![("ok.txt", b"ok")]));
    let sink = MemorySink::new();

    let config = ExtractConfig::default().with_delete_after(true);
    let report = recursive_extract(root, &sink, &config).unwrap();

    assert!(root.join("bad.zip").exists());
    assert!(!root.join("bad").exists());
    assert!(root.join("good/ok.txt").is_file());
    assert!(!root.join("good.zip").exists());

    // The corrupt archive is retried, and fails, on every pass
    assert_eq!(report.failed, 2);
    assert_eq!(report.extracted, 1);
    assert_eq!(
        sink.messages(LogCategory::Error)[0],
        format!("Extraction failed: {}", root.join("bad.zip").display())
    );
}

#[test]
fn test_zip_timestamp_survives_run() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("dated.zip"),
        &ZipTestBuilder::new()
            .add_file_with_time("report.txt", b"q1", (2023, 1, 15, 10, 30, 0))
            .build(),
    );

    recursive_extract(temp.path(), &MemorySink::new(), &ExtractConfig::default()).unwrap();

    let meta = fs::metadata(temp.path().join("dated/report.txt")).unwrap();
    let naive = NaiveDate::from_ymd_opt(2023, 1, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    let expected = chrono::Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap()
        .timestamp();
    assert_eq!(
        FileTime::from_last_modification_time(&meta).unix_seconds(),
        expected
    );
}

#[test]
fn test_legacy_names_recovered_end_to_end() {
    let temp = TempDir::new().unwrap();
    // "资料/说明.txt" in GBK, no UTF-8 flag
    let (name, _, had_errors) = encoding_rs::GBK.encode("资料/说明.txt");
    assert!(!had_errors);
    write(
        &temp.path().join("legacy.zip"),
        &RawZipBuilder::new()
            .add_file(&name, b"readme")
            .add_file(b"ascii.txt", b"plain")
            .build(),
    );

    let report =
        recursive_extract(temp.path(), &MemorySink::new(), &ExtractConfig::default()).unwrap();

    assert_eq!(report.extracted, 1);
    assert_eq!(
        fs::read(temp.path().join("legacy/资料/说明.txt")).unwrap(),
        b"readme"
    );
    assert!(temp.path().join("legacy/ascii.txt").is_file());
}

#[test]
fn test_traversal_archive_fails_without_escaping() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    write(
        &root.join("evil.zip"),
        &RawZipBuilder::new()
            .add_file(b"fine.txt", b"fine")
            .add_file(b"../../escaped.txt", b"evil")
            .build(),
    );
    write(&root.join("good.zip"), &create_test_zip(vec![("g.txt", b"g")]));

    let outcome = extract_archive(
        root.join("evil.zip"),
        &MemorySink::new(),
        &ExtractConfig::default(),
    );

    assert!(matches!(
        outcome,
        ExtractionOutcome::Failed(ExtractionError::PathTraversal { .. })
    ));
    assert!(!root.join("evil").exists());
    assert!(!temp.path().join("escaped.txt").exists());
    assert!(!root.join("escaped.txt").exists());

    let report = recursive_extract(&root, &MemorySink::new(), &ExtractConfig::default()).unwrap();
    assert_eq!(report.extracted, 1);
    assert!(root.join("good/g.txt").is_file());
}

#[test]
fn test_file_input_scans_parent() {
    let temp = TempDir::new().unwrap();
    let picked = temp.path().join("picked.zip");
    write(&picked, &create_test_zip(vec![("p.txt", b"p")]));
    write(
        &temp.path().join("sibling.tar"),
        &TarTestBuilder::new().add_file("s.txt", b"s").build(),
    );

    let root = resolve_scan_root(&picked).unwrap();
    let report = recursive_extract(&root, &MemorySink::new(), &ExtractConfig::default()).unwrap();

    assert_eq!(report.extracted, 2);
    assert!(temp.path().join("picked/p.txt").is_file());
    assert!(temp.path().join("sibling/s.txt").is_file());
}

#[test]
fn test_worker_streams_events_over_channel() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("a.zip"),
        &create_test_zip(vec![("a.txt", b"a")]),
    );

    let worker = ExtractionWorker::new();
    let (sink, events) = ChannelSink::channel();
    let handle = worker
        .start(temp.path().to_path_buf(), ExtractConfig::default(), sink)
        .unwrap();

    // The channel closes when the worker drops its sink
    let received: Vec<_> = events.iter().collect();
    let report = handle.join().unwrap();

    assert_eq!(report.extracted, 1);
    assert_eq!(received.first().unwrap().category, LogCategory::Path);
    assert_eq!(received.last().unwrap().category, LogCategory::Success);
    assert_eq!(received.last().unwrap().message, "All archives extracted");
    assert!(
        received
            .iter()
            .any(|event| event.message == format!("Extracted: {}", temp.path().join("a.zip").display()))
    );
}

#[test]
fn test_non_archives_untouched() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("notes.txt"), b"notes");
    write(&temp.path().join("image.zip.bak"), b"backup");
    write(&temp.path().join(".zip"), b"only a suffix");

    let report =
        recursive_extract(temp.path(), &MemorySink::new(), &ExtractConfig::default()).unwrap();

    assert_eq!(report.extracted, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped_unsupported, 3);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 3);
}

#[test]
fn test_tar_directory_timestamp_survives_run() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("dated.tar");
    write(
        &archive,
        &TarTestBuilder::new()
            .add_directory_with_mtime("d/", 1_500_000_000)
            .add_file("d/inner.txt", b"inner")
            .add_file("top.txt", b"top")
            .build(),
    );

    let outcome = extract_archive(&archive, &MemorySink::new(), &ExtractConfig::default());

    assert!(outcome.is_extracted());
    let meta = fs::metadata(temp.path().join("dated/d")).unwrap();
    assert_eq!(
        FileTime::from_last_modification_time(&meta).unix_seconds(),
        1_500_000_000
    );
}

#[cfg(unix)]
#[test]
fn test_non_utf8_inner_archive_name_extracted() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    // "中.zip" with the stem in GBK, as stored by legacy tools
    let inner = create_test_zip(vec![("data.txt", b"legacy")]);
    write(
        &temp.path().join("outer.tar"),
        &TarTestBuilder::new()
            .add_raw_name_file(b"\xd6\xd0.zip", &inner)
            .add_file("readme.txt", b"readme")
            .build(),
    );

    let report =
        recursive_extract(temp.path(), &MemorySink::new(), &ExtractConfig::default()).unwrap();

    assert_eq!(report.extracted, 2);
    assert_eq!(report.failed, 0);
    let target = temp.path().join("outer").join(OsStr::from_bytes(b"\xd6\xd0"));
    assert_eq!(fs::read(target.join("data.txt")).unwrap(), b"legacy");
}
