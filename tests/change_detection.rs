use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::tempdir;

use deltascan::config::Config;
use deltascan::engine::{Engine, RunSummary};
use deltascan::fs::mock::MockFileSystem;
use deltascan::fs::{FileSystem, RealFileSystem};
use deltascan::history;
use deltascan::scan::FileOutcome;
use deltascan_test_utils::builders::{write_file, ConfigBuilder};
use deltascan_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";
const WORLD_MD5: &str = "7d793037a0760186574b0282f2f435e7";

/// One process invocation: fresh engine, history loaded from disk.
async fn run_once(cfg: &Config, fs: Arc<dyn FileSystem>) -> Result<RunSummary, Box<dyn Error>> {
    let engine = Engine::new(cfg.clone(), fs)?;
    Ok(with_timeout(engine.run()).await?)
}

#[tokio::test]
async fn hash_mode_detects_first_seen_unchanged_and_edited_files() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = dir.path().join("watch");
    let store_path = dir.path().join("state/history.json");
    let a = write_file(&root, "a.txt", "hello");

    let cfg = ConfigBuilder::new(&store_path)
        .with_scan_path(&root)
        .with_extension(".txt")
        .build();
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    // First run: nothing recorded yet.
    let summary = run_once(&cfg, Arc::clone(&fs)).await?;
    assert_eq!(summary.roots[0].outcome_of(&a), Some(FileOutcome::Changed));
    assert_eq!(summary.files_changed(), 1);

    let stored = history::load(fs.as_ref(), &store_path)?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[&a].content_hash.as_deref(), Some(HELLO_MD5));
    let after_first = fs::read(&store_path)?;

    // Second run: same content.
    let summary = run_once(&cfg, Arc::clone(&fs)).await?;
    assert_eq!(summary.roots[0].outcome_of(&a), Some(FileOutcome::Unchanged));
    assert_eq!(summary.files_unchanged(), 1);
    assert_eq!(fs::read(&store_path)?, after_first);

    // Third run: content edited.
    fs::write(&a, "world")?;
    let summary = run_once(&cfg, Arc::clone(&fs)).await?;
    assert_eq!(summary.roots[0].outcome_of(&a), Some(FileOutcome::Changed));

    let stored = history::load(fs.as_ref(), &store_path)?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[&a].content_hash.as_deref(), Some(WORLD_MD5));

    Ok(())
}

#[tokio::test]
async fn timestamp_mode_reports_touched_file_as_changed() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = dir.path().join("watch");
    let store_path = dir.path().join("history.json");
    let a = write_file(&root, "a.txt", "hello");

    let cfg = ConfigBuilder::new(&store_path)
        .with_scan_path(&root)
        .use_hash(false)
        .build();
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let summary = run_once(&cfg, Arc::clone(&fs)).await?;
    assert_eq!(summary.files_changed(), 1);

    let summary = run_once(&cfg, Arc::clone(&fs)).await?;
    assert_eq!(summary.files_unchanged(), 1);

    // Same content, newer mtime.
    let later = SystemTime::now() + Duration::from_secs(60);
    fs::File::options().write(true).open(&a)?.set_modified(later)?;

    let summary = run_once(&cfg, Arc::clone(&fs)).await?;
    assert_eq!(summary.roots[0].outcome_of(&a), Some(FileOutcome::Changed));

    let stored = history::load(fs.as_ref(), &store_path)?;
    assert_eq!(stored[&a].content_hash, None);
    assert!(stored[&a].modified_time.is_some());

    Ok(())
}

#[tokio::test]
async fn unchanged_files_do_not_rewrite_history() -> TestResult {
    init_tracing();

    let mock = MockFileSystem::new();
    mock.add_file("/watch/a.txt", b"hello");
    mock.add_file("/watch/b.txt", b"again");
    let cfg = ConfigBuilder::new("/state/history.json")
        .with_scan_path("/watch")
        .build();

    run_once(&cfg, Arc::new(mock.clone())).await?;
    // One full-map write per changed file.
    assert_eq!(mock.write_count("/state/history.json"), 2);

    let summary = run_once(&cfg, Arc::new(mock.clone())).await?;
    assert_eq!(summary.files_unchanged(), 2);
    assert_eq!(mock.write_count("/state/history.json"), 2);

    Ok(())
}

#[tokio::test]
async fn per_file_errors_do_not_stop_siblings() -> TestResult {
    init_tracing();

    let mock = MockFileSystem::new();
    mock.add_file("/watch/good.txt", b"fine");
    mock.add_file("/watch/bad.txt", b"unreadable");
    mock.add_file("/watch/also_good.txt", b"fine too");
    mock.fail_on("/watch/bad.txt");

    let cfg = ConfigBuilder::new("/state/history.json")
        .with_scan_path("/watch")
        .build();
    let engine = Engine::new(cfg, Arc::new(mock.clone()))?;
    let summary = with_timeout(engine.run()).await?;

    let report = &summary.roots[0];
    assert_eq!(report.outcome_of(Path::new("/watch/bad.txt")), Some(FileOutcome::Error));
    assert_eq!(report.outcome_of(Path::new("/watch/good.txt")), Some(FileOutcome::Changed));
    assert_eq!(summary.files_changed(), 2);
    assert_eq!(summary.files_in_error(), 1);

    assert_eq!(engine.store().len(), 2);
    assert!(engine.store().get(Path::new("/watch/bad.txt")).is_unknown());

    Ok(())
}

#[tokio::test]
async fn missing_root_is_counted_and_later_roots_still_run() -> TestResult {
    init_tracing();

    let mock = MockFileSystem::new();
    mock.add_file("/second/a.txt", b"hello");

    let cfg = ConfigBuilder::new("/state/history.json")
        .with_scan_path("/first")
        .with_scan_path("/second")
        .build();
    let summary = run_once(&cfg, Arc::new(mock)).await?;

    assert_eq!(summary.roots.len(), 2);
    assert!(summary.roots[0].root_error.is_some());
    assert_eq!(summary.roots[1].root, Path::new("/second"));
    assert_eq!(summary.files_in_error(), 1);
    assert_eq!(summary.files_changed(), 1);

    Ok(())
}

#[tokio::test]
async fn corrupted_history_aborts_the_run() -> TestResult {
    init_tracing();

    let mock = MockFileSystem::new();
    mock.add_file("/watch/a.txt", b"hello");
    mock.add_file("/state/history.json", b"[{\"filePath\": \"/watch/a.txt\", ");

    let cfg = ConfigBuilder::new("/state/history.json")
        .with_scan_path("/watch")
        .build();

    match Engine::new(cfg, Arc::new(mock)) {
        Err(deltascan::errors::DeltascanError::HistoryCorrupt { .. }) => Ok(()),
        Err(e) => panic!("expected HistoryCorrupt, got {e:?}"),
        Ok(_) => panic!("expected HistoryCorrupt, got an engine"),
    }
}

#[tokio::test]
async fn extension_filter_limits_candidates() -> TestResult {
    init_tracing();

    let mock = MockFileSystem::new();
    mock.add_file("/watch/a.TXT", b"1");
    mock.add_file("/watch/nested/b.pdf", b"2");
    mock.add_file("/watch/c.png", b"3");

    let cfg = ConfigBuilder::new("/state/history.json")
        .with_scan_path("/watch")
        .with_extension("txt")
        .with_extension(".PDF")
        .build();
    let summary = run_once(&cfg, Arc::new(mock)).await?;

    let seen: Vec<_> = summary.roots[0].files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(seen.len(), 2);
    assert!(summary.roots[0].outcome_of(Path::new("/watch/c.png")).is_none());

    Ok(())
}

#[tokio::test]
async fn history_store_inside_watch_root_is_never_a_candidate() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = dir.path().join("watch");
    write_file(&root, "a.txt", "hello");
    write_file(&root, "data.json", "{}");
    let store_path = root.join("history.json");

    let cfg = ConfigBuilder::new(&store_path)
        .with_scan_path(&root)
        .with_extension("json")
        .with_extension("tmp")
        .build();

    let first = run_once(&cfg, Arc::new(RealFileSystem)).await?;
    assert_eq!(first.files_changed(), 2);

    for _ in 0..2 {
        let summary = run_once(&cfg, Arc::new(RealFileSystem)).await?;
        assert_eq!(summary.files_changed(), 0);
        assert_eq!(summary.files_unchanged(), 2);
        assert!(summary.roots[0].outcome_of(&store_path).is_none());
    }

    Ok(())
}

#[tokio::test]
async fn empty_extension_list_scans_nothing() -> TestResult {
    init_tracing();

    let mock = MockFileSystem::new();
    mock.add_file("/watch/a.txt", b"1");
    mock.add_file("/watch/b.bin", b"2");

    let mut raw = ConfigBuilder::new("/state/history.json")
        .with_scan_path("/watch")
        .raw();
    raw.file_extensions.clear();
    let cfg = Config::try_from(raw)?;
    let summary = run_once(&cfg, Arc::new(mock.clone())).await?;

    assert_eq!(summary.totals().total(), 0);
    assert_eq!(mock.write_count("/state/history.json"), 0);

    Ok(())
}
