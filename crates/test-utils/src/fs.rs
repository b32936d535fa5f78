#![allow(dead_code)]

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use deltascan::fs::mock::MockFileSystem;
use deltascan::fs::FileSystem;

/// `MockFileSystem` wrapper for timing-sensitive tests.
///
/// - Copies can be slowed down; the peak number of copies in flight is kept.
/// - The next `write_atomic` can be parked until the test releases it.
#[derive(Debug, Default)]
pub struct InstrumentedFs {
    pub inner: MockFileSystem,
    copy_delay: Duration,
    copies_in_flight: AtomicUsize,
    copy_peak: AtomicUsize,
    write_gate: Mutex<Option<WriteGate>>,
}

#[derive(Debug)]
struct WriteGate {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Test side of a parked write: `entered` fires once the write is parked,
/// sending on `release` lets it proceed.
#[derive(Debug)]
pub struct WriteGateHandle {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

impl InstrumentedFs {
    pub fn new(inner: MockFileSystem) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn with_copy_delay(mut self, delay: Duration) -> Self {
        self.copy_delay = delay;
        self
    }

    /// Highest number of `copy` calls observed running at the same time.
    pub fn copy_peak(&self) -> usize {
        self.copy_peak.load(Ordering::SeqCst)
    }

    /// Park the next `write_atomic` call until the returned handle releases it.
    pub fn gate_next_write(&self) -> WriteGateHandle {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.write_gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(WriteGate {
            entered: entered_tx,
            release: release_rx,
        });
        WriteGateHandle {
            entered: entered_rx,
            release: release_tx,
        }
    }
}

impl FileSystem for InstrumentedFs {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        self.inner.open_read(path)
    }
    fn modified_millis(&self, path: &Path) -> Result<Option<i64>> {
        self.inner.modified_millis(path)
    }
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let gate = self
            .write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.recv();
        }
        self.inner.write_atomic(path, contents)
    }
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let now = self.copies_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.copy_peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.copy_delay);
        let copied = self.inner.copy(from, to);
        self.copies_in_flight.fetch_sub(1, Ordering::SeqCst);
        copied
    }
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.inner.create_dir_all(path)
    }
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }
    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }
    fn is_symlink(&self, path: &Path) -> bool {
        self.inner.is_symlink(path)
    }
    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.inner.canonicalize(path)
    }
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }
}
