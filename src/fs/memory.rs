//! In-memory filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{PoisonError, RwLock};

use super::{FileSystem, FsEntry, clean_path};

/// Files held in memory, keyed by slash-separated path.
///
/// Directories are implied by the paths of the files they contain. Files can
/// be added or removed through a shared reference, which lets a test repair a
/// missing template while a registry holds the filesystem.
///
/// ```rust
/// use templator::fs::{FileSystem, MemoryFs};
///
/// let fs = MemoryFs::new().with_file("templates/home.html", "<h1>{{ Title }}</h1>");
/// assert_eq!(fs.read_file("templates/home.html").unwrap(), b"<h1>{{ Title }}</h1>");
/// ```
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_file(self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file.
    pub fn insert(&self, path: &str, contents: impl Into<Vec<u8>>) {
        let key = clean_path(path).unwrap_or_else(|_| path.to_string());
        self.files.write().unwrap_or_else(PoisonError::into_inner).insert(key, contents.into());
    }

    /// Remove a file, returning its contents.
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        let key = clean_path(path).ok()?;
        self.files.write().unwrap_or_else(PoisonError::into_inner).remove(&key)
    }

    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileSystem for MemoryFs {
    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        let key = clean_path(path)?;
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("file not found: {key}")))
    }

    fn walk(&self, root: &str) -> io::Result<Vec<FsEntry>> {
        let root = clean_path(root)?;
        let prefix = if root.is_empty() { String::new() } else { format!("{root}/") };
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);

        if files.contains_key(&root) {
            return Ok(vec![FsEntry::file(root)]);
        }

        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        for path in files.keys().filter(|p| p.starts_with(&prefix)) {
            let mut parent = path.as_str();
            while let Some((dir, _)) = parent.rsplit_once('/') {
                if dir.len() < root.len() {
                    break;
                }
                dirs.insert(dir.to_string());
                parent = dir;
            }
            entries.push(FsEntry::file(path.clone()));
        }

        if entries.is_empty() && !root.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {root}"),
            ));
        }

        dirs.insert(root);
        entries.extend(dirs.into_iter().map(FsEntry::dir));
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
