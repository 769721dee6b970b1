//! Compiled-template cache.
//!
//! A [`Registry`] turns logical template names into shared [`Handler`]s. The
//! first `get` for a name reads `base_path/name.ext` from the registry's
//! [`FileSystem`], optionally validates its field references against a
//! [`Shape`], compiles it and stores the handler. Later calls return the same
//! `Arc`.
//!
//! # Concurrency
//!
//! The cache itself sits behind an `RwLock`, so hits only take a shared
//! lock. Resolution is serialized per name through a lock slot kept in a
//! [`DashMap`]: concurrent misses for one name wait for the first resolver
//! and then find its result in the cache, while misses for different names
//! resolve in parallel. Slots are removed once nobody waits on them.
//!
//! Failures are returned to every caller and never cached; the next `get`
//! for the name starts over.
//!
//! ```rust
//! use serde::Serialize;
//! use templator::cancel::CancelContext;
//! use templator::fs::MemoryFs;
//! use templator::impl_shaped;
//! use templator::registry::Registry;
//!
//! #[derive(Serialize)]
//! struct Page {
//!     #[serde(rename = "Title")]
//!     title: String,
//! }
//! impl_shaped!(Page { title as "Title": String });
//!
//! let fs = MemoryFs::new().with_file("templates/home.html", "<h1>{{ Title }}</h1>");
//! let registry = Registry::<Page>::builder(fs).field_validation().build().unwrap();
//!
//! let home = registry.get("home").unwrap();
//! let page = Page { title: "Welcome".into() };
//! let html = home.render_to_string(Some(&CancelContext::background()), &page).unwrap();
//! assert_eq!(html, "<h1>Welcome</h1>");
//! ```

mod builder;
mod stats;

pub use builder::RegistryBuilder;
pub use stats::CacheStats;

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use dashmap::DashMap;

use crate::config::RegistryConfig;
use crate::core::{Error, LookupError};
use crate::fs::{self, FileSystem};
use crate::functions::FuncMap;
use crate::handler::Handler;
use crate::shape::Shape;
use crate::validation::validate_template;

use stats::StatsCounters;

/// Thread-safe cache of compiled templates for data type `T`.
pub struct Registry<T> {
    fs: Arc<dyn FileSystem>,
    config: RegistryConfig,
    shape: Option<Shape>,
    funcs: FuncMap,
    cache: RwLock<HashMap<String, Arc<Handler<T>>>>,
    /// One lock per name currently being resolved
    resolving: DashMap<String, Arc<Mutex<()>>>,
    stats: StatsCounters,
}

impl<T> Registry<T> {
    /// A registry over `fs` with the default settings: templates are read
    /// from `templates/<name>.html`, without validation or extra functions.
    pub fn new(fs: impl FileSystem + 'static) -> Result<Self, crate::core::ConstructionError> {
        Self::builder(fs).build()
    }

    /// Start configuring a registry over `fs`.
    pub fn builder(fs: impl FileSystem + 'static) -> RegistryBuilder<T> {
        RegistryBuilder::new(Arc::new(fs))
    }

    pub(crate) fn from_parts(
        fs: Arc<dyn FileSystem>,
        config: RegistryConfig,
        shape: Option<Shape>,
        funcs: FuncMap,
    ) -> Self {
        Self {
            fs,
            config,
            shape,
            funcs,
            cache: RwLock::new(HashMap::new()),
            resolving: DashMap::new(),
            stats: StatsCounters::default(),
        }
    }

    /// The handler for `name`, compiling it on first use.
    ///
    /// `name` is slash-separated and has no extension: `about/team` reads
    /// `templates/about/team.html` with the default settings. Spellings of
    /// the same path (`./home`, `home`) share one cache entry.
    ///
    /// # Errors
    ///
    /// - [`Error::Lookup`] when the file is missing, unreadable or not UTF-8
    /// - [`Error::Validation`] when a field reference does not resolve on the
    ///   configured shape
    /// - [`Error::Compile`] when Tera rejects the source
    pub fn get(&self, name: &str) -> Result<Arc<Handler<T>>, Error> {
        // Names that fail to clean keep their spelling and fail in `resolve`.
        let key = fs::clean_path(name).unwrap_or_else(|_| name.to_string());
        let name = key.as_str();

        if let Some(handler) = self.cached(name) {
            self.stats.hit();
            tracing::trace!(target: "templator::registry", "Cache hit for '{}'", name);
            return Ok(handler);
        }

        let slot = Arc::clone(&self.resolving.entry(key.clone()).or_default());
        let result = {
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            // Another caller may have finished while we waited for the slot.
            if let Some(handler) = self.cached(name) {
                self.stats.hit();
                tracing::trace!(
                    target: "templator::registry",
                    "'{}' resolved while waiting",
                    name
                );
                Ok(handler)
            } else {
                self.stats.miss();
                self.resolve(name).map(|handler| {
                    let handler = Arc::new(handler);
                    self.cache
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(key.clone(), Arc::clone(&handler));
                    handler
                })
            }
        };

        drop(slot);
        self.resolving.remove_if(name, |_, slot| Arc::strong_count(slot) == 1);
        result
    }

    fn cached(&self, name: &str) -> Option<Arc<Handler<T>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    fn resolve(&self, name: &str) -> Result<Handler<T>, Error> {
        let path = self.config.template_path(name);
        tracing::debug!(target: "templator::registry", "Resolving '{}' from {}", name, path);

        let bytes = self.fs.read_file(&path).map_err(|e| LookupError::from_io(name, &path, e))?;
        let source = String::from_utf8(bytes).map_err(|e| LookupError::Read {
            name: name.to_string(),
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        if let Some(shape) = &self.shape {
            validate_template(name, &source, shape)?;
        }

        let handler = Handler::compile(name, &self.config.file_name(name), &source, &self.funcs)?;
        self.stats.compiled();
        tracing::debug!(target: "templator::registry", "Compiled '{}'", name);
        Ok(handler)
    }

    /// Logical names of every template below the base path, sorted.
    ///
    /// Files without the configured extension are skipped.
    pub fn discover(&self) -> Result<Vec<String>, LookupError> {
        let base = &self.config.base_path;
        let entries = self.fs.walk(base).map_err(|e| LookupError::from_io(base, base, e))?;

        let mut names: Vec<String> = entries
            .into_iter()
            .filter(|entry| !entry.is_dir)
            .filter_map(|entry| self.config.logical_name(&entry.path))
            .collect();
        names.sort();
        names.dedup();

        tracing::debug!(
            target: "templator::registry",
            "Discovered {} template(s) under '{}'",
            names.len(),
            base
        );
        Ok(names)
    }

    /// Resolve every discovered template, stopping at the first failure.
    ///
    /// Returns the number of templates now cached.
    pub fn preload(&self) -> Result<usize, Error> {
        for name in self.discover()? {
            self.get(&name)?;
        }
        Ok(self.len())
    }

    /// Whether `name` has been compiled and cached.
    pub fn is_cached(&self, name: &str) -> bool {
        let key = fs::clean_path(name).unwrap_or_else(|_| name.to_string());
        self.cache.read().unwrap_or_else(PoisonError::into_inner).contains_key(&key)
    }

    /// Names of the cached templates, sorted.
    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.cache.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached handler and reset the statistics.
    ///
    /// Handlers already handed out stay usable.
    pub fn clear(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.stats.reset();
        tracing::debug!(target: "templator::registry", "Cleared template cache");
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Path `name` is read from.
    pub fn template_path(&self, name: &str) -> String {
        self.config.template_path(name)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Shape templates are validated against, if validation is enabled.
    pub fn validation_shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// Filters and functions every compiled template receives.
    pub fn functions(&self) -> &FuncMap {
        &self.funcs
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("validation", &self.shape.as_ref().map(Shape::type_name))
            .field("functions", &self.funcs)
            .field("cached", &self.cached_names())
            .finish_non_exhaustive()
    }
}
