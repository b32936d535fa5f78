use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use tempfile::tempdir;

use deltascan::fs::mock::MockFileSystem;
use deltascan::fs::{FileSystem, RealFileSystem};
use deltascan::history::{self, FingerprintRecord, HistoryStore};
use deltascan_test_utils::fs::InstrumentedFs;
use deltascan_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

const STORE: &str = "/state/history.json";

fn record_strategy() -> impl Strategy<Value = FingerprintRecord> {
    (
        0..6usize,
        proptest::option::of("[0-9a-f]{32}"),
        proptest::option::of(any::<i64>()),
    )
        .prop_map(|(idx, hash, mtime)| {
            FingerprintRecord::new(format!("/watch/file_{idx}.txt"), hash, mtime)
        })
}

proptest! {
    /// Reloading after any sequence of `set` calls yields one entry per path,
    /// equal to the last record set for it.
    #[test]
    fn reload_keeps_last_write_per_path(
        records in proptest::collection::vec(record_strategy(), 1..30)
    ) {
        let mock = MockFileSystem::new();
        let store = HistoryStore::open(Arc::new(mock.clone()), STORE).unwrap();

        let mut expected: HashMap<PathBuf, FingerprintRecord> = HashMap::new();
        for record in records {
            expected.insert(record.file_path.clone(), record.clone());
            store.set(record).unwrap();
        }

        let reloaded = history::load(&mock, STORE.as_ref()).unwrap();
        prop_assert_eq!(reloaded, expected);
    }
}

#[test]
fn setting_identical_record_twice_keeps_file_content() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("history.json");
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let store = HistoryStore::open(Arc::clone(&fs), &path)?;

    store.set(FingerprintRecord::new("/b", Some("bb".into()), Some(2)))?;
    let record = FingerprintRecord::new("/a", Some("aa".into()), Some(1));
    store.set(record.clone())?;
    let first = std::fs::read(&path)?;

    store.set(record)?;
    let second = std::fs::read(&path)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn reads_history_written_by_older_versions() -> TestResult {
    init_tracing();

    let mock = MockFileSystem::new();
    mock.add_file(
        STORE,
        r#"[
            {"filePath": "/a.txt", "md5Hash": "5d41402abc4b2a76b9719d911017c592", "modifiedTime": 1700000000000},
            {"filePath": "/b.txt", "md5Hash": "NOT CALCULATED", "modifiedTime": 1700000000001},
            {"filePath": "/a.txt", "md5Hash": "7d793037a0760186574b0282f2f435e7", "modifiedTime": 1700000000002}
        ]"#,
    );

    let store = HistoryStore::open(Arc::new(mock), STORE)?;
    assert_eq!(store.len(), 2);
    assert_eq!(
        store.get("/a.txt".as_ref()).content_hash.as_deref(),
        Some("7d793037a0760186574b0282f2f435e7")
    );
    assert_eq!(store.get("/b.txt".as_ref()).content_hash, None);
    assert_eq!(store.get("/b.txt".as_ref()).modified_time, Some(1_700_000_000_001));
    Ok(())
}

#[test]
fn missing_history_file_starts_empty() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let store = HistoryStore::open(Arc::new(RealFileSystem), dir.path().join("none.json"))?;
    assert!(store.is_empty());
    assert!(!dir.path().join("none.json").exists());
    Ok(())
}

#[test]
fn truncated_history_file_is_rejected() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("history.json");
    std::fs::write(&path, r#"[{"filePath": "/a.txt", "md5Hash": "5d41"#)?;

    let err = HistoryStore::open(Arc::new(RealFileSystem), &path).unwrap_err();
    assert!(err.to_string().contains("history file may be corrupted"));
    Ok(())
}

#[test]
fn get_does_not_wait_for_a_pending_write() -> TestResult {
    init_tracing();

    let fs = Arc::new(InstrumentedFs::new(MockFileSystem::new()));
    let store = Arc::new(HistoryStore::open(fs.clone(), STORE)?);
    let gate = fs.gate_next_write();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store.set(FingerprintRecord::new("/watch/a.txt", Some("aa".into()), Some(1)))
        })
    };
    gate.entered.recv_timeout(Duration::from_secs(5))?;

    // The writer is parked inside `write_atomic`; readers must still get through.
    let (tx, rx) = mpsc::channel();
    {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            let _ = tx.send(store.get(Path::new("/watch/a.txt")));
        });
    }
    let seen = rx.recv_timeout(Duration::from_secs(1))?;
    assert_eq!(seen.content_hash.as_deref(), Some("aa"));

    gate.release.send(())?;
    writer.join().expect("writer thread panicked")?;
    assert_eq!(fs.inner.write_count(STORE), 1);

    let on_disk = history::load(fs.as_ref(), STORE.as_ref())?;
    assert_eq!(on_disk.len(), 1);
    Ok(())
}
