//! Test utilities for templator
//!
//! Available to the crate's own tests and, through the `test-utils` feature,
//! to the integration tests.
//!
//! - [`init_test_logging`] installs a tracing subscriber once per process
//! - [`CountingFs`] wraps a filesystem and records every read, which lets a
//!   test assert how often a registry actually touched the source
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use templator::fs::MemoryFs;
//! use templator::registry::Registry;
//! use templator::test_utils::CountingFs;
//!
//! let fs = Arc::new(CountingFs::new(MemoryFs::new().with_file("templates/a.html", "a")));
//! let registry = Registry::<serde_json::Value>::new(Arc::clone(&fs)).unwrap();
//! registry.get("a").unwrap();
//! registry.get("a").unwrap();
//! assert_eq!(fs.reads("templates/a.html"), 1);
//! ```

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, Once, PoisonError};
use std::time::Duration;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::fs::{FileSystem, FsEntry};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; does nothing when neither
/// is set. Only the first call in a process has an effect.
///
/// ```bash
/// RUST_LOG=templator=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}

/// A filesystem wrapper that counts reads per path.
///
/// An optional delay is applied to every read, widening the window in which
/// concurrent lookups overlap.
#[derive(Debug)]
pub struct CountingFs<F> {
    inner: F,
    delay: Option<Duration>,
    reads: Mutex<HashMap<String, usize>>,
}

impl<F: FileSystem> CountingFs<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            delay: None,
            reads: Mutex::new(HashMap::new()),
        }
    }

    /// Sleep for `delay` before every read.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Number of reads of `path` so far.
    pub fn reads(&self, path: &str) -> usize {
        self.reads.lock().unwrap_or_else(PoisonError::into_inner).get(path).copied().unwrap_or(0)
    }

    /// Number of reads across all paths.
    pub fn total_reads(&self) -> usize {
        self.reads.lock().unwrap_or_else(PoisonError::into_inner).values().sum()
    }
}

impl<F: FileSystem> FileSystem for CountingFs<F> {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        *self
            .reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default() += 1;
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.inner.read_file(path)
    }

    fn walk(&self, root: &str) -> io::Result<Vec<FsEntry>> {
        self.inner.walk(root)
    }
}
