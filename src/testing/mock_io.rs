//! Mock sinks and temporary paths for testing writers without real files.
//!
//! Every sink here also implements [`FinishWrite`], so it can stand in for a
//! file-backed [`OutputSink`](crate::io::compression::OutputSink).

use crate::io::compression::FinishWrite;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::TempDir;

/// A cloneable in-memory sink.
///
/// Every clone shares the same buffer, so a test can keep one handle while a
/// writer owns another and read the output back after the writer is gone.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as UTF-8 (lossy).
    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FinishWrite for SharedBuffer {
    fn finish_write(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

/// Counters shared between a [`ProbeSink`] and the test observing it.
#[derive(Debug, Default)]
pub struct SinkStats {
    writes: AtomicUsize,
    flushes: AtomicUsize,
    closes: AtomicUsize,
}

impl SinkStats {
    /// Number of `write` calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of `flush` calls.
    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Number of times the sink was closed (dropped or finished).
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A sink that records writes, flushes and closes (drops).
///
/// ```
/// use tablewriter::testing::ProbeSink;
/// use std::io::Write;
///
/// let (mut sink, stats) = ProbeSink::new();
/// sink.write_all(b"a,b\n").unwrap();
/// sink.flush().unwrap();
/// drop(sink);
/// assert_eq!(stats.flushes(), 1);
/// assert_eq!(stats.closes(), 1);
/// ```
#[derive(Debug)]
pub struct ProbeSink {
    buffer: SharedBuffer,
    stats: Arc<SinkStats>,
}

impl ProbeSink {
    /// Create a probe and the handle used to inspect it.
    pub fn new() -> (Self, Arc<SinkStats>) {
        Self::with_buffer(SharedBuffer::new())
    }

    /// Create a probe that records its bytes into `buffer`.
    pub fn with_buffer(buffer: SharedBuffer) -> (Self, Arc<SinkStats>) {
        let stats = Arc::new(SinkStats::default());
        (
            Self {
                buffer,
                stats: Arc::clone(&stats),
            },
            stats,
        )
    }
}

impl Write for ProbeSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stats.writes.fetch_add(1, Ordering::SeqCst);
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stats.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl FinishWrite for ProbeSink {
    fn finish_write(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

impl Drop for ProbeSink {
    fn drop(&mut self) {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// A sink that starts failing once a byte budget is spent.
///
/// Bytes within the budget are kept (see [`FailingSink::buffer`]); the write
/// that would exceed it fails with [`io::ErrorKind::WriteZero`] without
/// writing anything.
#[derive(Debug)]
pub struct FailingSink {
    buffer: SharedBuffer,
    budget: usize,
    fail_flush: bool,
    fail_close: bool,
}

impl FailingSink {
    /// Accept up to `budget` bytes, then fail every write.
    pub fn after_bytes(budget: usize) -> Self {
        Self {
            buffer: SharedBuffer::new(),
            budget,
            fail_flush: false,
            fail_close: false,
        }
    }

    /// Accept all writes but fail every flush.
    pub fn on_flush() -> Self {
        Self {
            buffer: SharedBuffer::new(),
            budget: usize::MAX,
            fail_flush: true,
            fail_close: false,
        }
    }

    /// Accept all writes and flushes but fail [`FinishWrite::finish_write`].
    pub fn on_close() -> Self {
        Self {
            buffer: SharedBuffer::new(),
            budget: usize::MAX,
            fail_flush: false,
            fail_close: true,
        }
    }

    /// A handle to the bytes accepted so far.
    pub fn buffer(&self) -> SharedBuffer {
        self.buffer.clone()
    }
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.budget {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "sink budget exhausted"));
        }
        self.budget -= buf.len();
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.fail_flush {
            return Err(io::Error::other("flush rejected"));
        }
        Ok(())
    }
}

impl FinishWrite for FailingSink {
    fn finish_write(mut self: Box<Self>) -> io::Result<()> {
        self.flush()?;
        if self.fail_close {
            return Err(io::Error::other("close rejected"));
        }
        Ok(())
    }
}

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file path within this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}

/// Read a written (uncompressed) table file back as text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not UTF-8.
pub fn read_table_output(path: impl AsRef<Path>) -> io::Result<String> {
    std::fs::read_to_string(path)
}
