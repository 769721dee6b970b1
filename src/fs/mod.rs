//! Filesystem abstraction templates are read from.
//!
//! Paths handed to a [`FileSystem`] are slash-separated and relative to the
//! filesystem's root, regardless of platform. Both implementations reject
//! absolute paths and `..` segments so a template name can never reach
//! outside the root.
//!
//! - [`DirFs`] reads from a directory on disk
//! - [`MemoryFs`] keeps files in memory, mainly for tests and embedding

mod memory;

pub use memory::MemoryFs;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

/// One entry produced by [`FileSystem::walk`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FsEntry {
    /// Slash-separated path relative to the filesystem root
    pub path: String,
    pub is_dir: bool,
}

impl FsEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// Read access to named byte blobs.
///
/// Implementations must be safe to call from many threads at once; the
/// registry takes no lock around them.
pub trait FileSystem: Send + Sync {
    /// Read the whole file at `path`.
    ///
    /// A missing file is reported with [`io::ErrorKind::NotFound`].
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;

    /// List every entry below `root`, including `root` itself, in a
    /// deterministic order.
    fn walk(&self, root: &str) -> io::Result<Vec<FsEntry>>;
}

impl<F: FileSystem + ?Sized> FileSystem for Arc<F> {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        (**self).read_file(path)
    }

    fn walk(&self, root: &str) -> io::Result<Vec<FsEntry>> {
        (**self).walk(root)
    }
}

impl<F: FileSystem + ?Sized> FileSystem for &'static F {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        (**self).read_file(path)
    }

    fn walk(&self, root: &str) -> io::Result<Vec<FsEntry>> {
        (**self).walk(root)
    }
}

/// Normalize a slash-separated relative path.
///
/// Empty and `.` segments are dropped; absolute paths and `..` segments are
/// rejected with [`io::ErrorKind::InvalidInput`].
pub fn clean_path(path: &str) -> io::Result<String> {
    if path.starts_with('/') || path.starts_with('\\') || Path::new(path).is_absolute() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("absolute path not allowed: {path}"),
        ));
    }

    let mut segments = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path escapes the filesystem root: {path}"),
                ));
            }
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

/// Join two slash-separated paths, skipping empty parts.
pub fn join(base: &str, rest: &str) -> String {
    match (base.trim_end_matches('/'), rest.trim_start_matches('/')) {
        ("", rest) => rest.to_string(),
        (base, "") => base.to_string(),
        (base, rest) => format!("{base}/{rest}"),
    }
}

/// A directory on disk.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let clean = clean_path(path)?;
        let mut resolved = self.root.clone();
        resolved.extend(clean.split('/').filter(|s| !s.is_empty()));
        Ok(resolved)
    }
}

impl FileSystem for DirFs {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        let resolved = self.resolve(path)?;
        tracing::trace!(target: "templator::fs", "Reading {}", resolved.display());
        std::fs::read(resolved)
    }

    fn walk(&self, root: &str) -> io::Result<Vec<FsEntry>> {
        let base = clean_path(root)?;
        let start = self.resolve(&base)?;
        let mut entries = Vec::new();
        for entry in WalkDir::new(&start).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry.path().strip_prefix(&self.root).map_err(io::Error::other)?;
            let path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.push(FsEntry {
                path,
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(entries)
    }
}
