//! Integration tests for building and persisting issue reports
//!
//! File mode end to end: throttling, on-disk format, and concurrent callers.

use coadmin_core::issues::{fingerprint, issue_file_path};
use coadmin_core::{Fields, Level, Report, Reporter, ReporterConfig, Submission};
use std::sync::{Arc, Barrier};
use std::time::Duration;
use tempfile::TempDir;

fn file_config(dir: &TempDir) -> ReporterConfig {
    coadmin_core::logging::init_test();
    ReporterConfig {
        folder: dir.path().to_path_buf(),
        minimum_interval_secs: 60,
        ..Default::default()
    }
}

fn read_report(path: &std::path::Path) -> Report {
    let data = std::fs::read(path).expect("issue file should exist");
    serde_json::from_slice(&data).expect("issue file should be a report")
}

// ============================================
// File mode
// ============================================

#[test]
fn test_repeat_within_interval_is_suppressed() {
    let dir = TempDir::new().unwrap();
    let reporter = Reporter::new("billing", file_config(&dir)).unwrap();

    let mut extra = Fields::new();
    extra.insert("mount".to_string(), serde_json::json!("/data"));

    let first = reporter
        .add("disk full", Level::Error, extra.clone(), Fields::new())
        .expect("first report should be written");
    let expected_path = issue_file_path(dir.path(), fingerprint("billing", Level::Error, "disk full"));
    assert_eq!(first, Submission::Written(expected_path.clone()));
    assert!(first.is_accepted());

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&expected_path).unwrap()).unwrap();
    assert_eq!(raw["level"], "error");
    assert_eq!(raw["app"], "billing");
    assert_eq!(raw["description"], "disk full");
    assert_eq!(raw["extra"]["mount"], "/data");
    assert_eq!(raw["v"], 5);
    assert_eq!(raw["caller"], "not_implemented");
    assert_eq!(raw["libversion"], "unknown");
    assert!(raw["meta"]["hostname"].is_string());

    let before = std::fs::read(&expected_path).unwrap();

    let second = reporter
        .add("disk full", Level::Error, extra, Fields::new())
        .unwrap();
    assert_eq!(second, Submission::Suppressed);
    assert!(!second.is_accepted());

    // No second file and the first one is untouched
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    assert_eq!(std::fs::read(&expected_path).unwrap(), before);
}

#[test]
fn test_distinct_texts_never_throttle_each_other() {
    let dir = TempDir::new().unwrap();
    let reporter = Reporter::new("billing", file_config(&dir)).unwrap();

    let a = reporter.error("disk full", Fields::new(), Fields::new()).unwrap();
    let b = reporter.error("disk failing", Fields::new(), Fields::new()).unwrap();

    assert!(a.is_accepted());
    assert!(b.is_accepted());
    assert_ne!(a, b);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_same_text_different_level_is_distinct() {
    let dir = TempDir::new().unwrap();
    let reporter = Reporter::new("billing", file_config(&dir)).unwrap();

    assert!(reporter.error("disk full", Fields::new(), Fields::new()).unwrap().is_accepted());
    assert!(reporter.fatal("disk full", Fields::new(), Fields::new()).unwrap().is_accepted());
    assert!(!reporter.error("Disk Full", Fields::new(), Fields::new()).unwrap().is_accepted());
}

#[test]
fn test_throttle_window_reopens() {
    let dir = TempDir::new().unwrap();
    let reporter = Reporter::new("billing", file_config(&dir)).unwrap();
    let t0 = chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
    let add = |at| {
        reporter
            .add_at("queue stuck", Level::Warning, Fields::new(), Fields::new(), at)
            .unwrap()
    };

    assert!(add(t0).is_accepted());
    assert!(!add(t0 + chrono::TimeDelta::seconds(59)).is_accepted());

    let third = add(t0 + chrono::TimeDelta::seconds(60));
    let Submission::Written(path) = third else {
        panic!("expected the report to be written again, got {third:?}");
    };
    assert_eq!(read_report(&path).timestamp_millis, 1_700_000_060_000);
}

#[test]
fn test_missing_folder_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = ReporterConfig {
        folder: dir.path().join("missing"),
        ..Default::default()
    };
    let reporter = Reporter::new("billing", config).unwrap();

    let result = reporter.error("disk full", Fields::new(), Fields::new());
    assert!(matches!(result, Err(coadmin_core::Error::Io(_))));
}

#[test]
fn test_concurrent_callers_admit_exactly_one() {
    const THREADS: usize = 16;
    let dir = TempDir::new().unwrap();
    let reporter = Arc::new(Reporter::new("billing", file_config(&dir)).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let reporter = Arc::clone(&reporter);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                reporter
                    .error("disk full", Fields::new(), Fields::new())
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<Submission> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted = results.iter().filter(|s| s.is_accepted()).count();
    let suppressed = results
        .iter()
        .filter(|s| **s == Submission::Suppressed)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(suppressed, THREADS - 1);
}

#[test]
fn test_file_mode_flush_is_immediate() {
    let dir = TempDir::new().unwrap();
    let reporter = Reporter::new("billing", file_config(&dir)).unwrap();
    reporter.info("started", Fields::new(), Fields::new()).unwrap();
    assert!(reporter.wait_until_empty(Duration::ZERO));
    assert_eq!(reporter.pending(), 0);
}
