//! Builder for [`Registry`].

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::core::ConstructionError;
use crate::fs::FileSystem;
use crate::functions::FuncMap;
use crate::shape::{Shape, Shaped};

use super::Registry;

/// Configures a [`Registry`] before it is built.
///
/// ```rust
/// use templator::fs::MemoryFs;
/// use templator::functions::FuncMap;
/// use templator::registry::Registry;
///
/// let registry = Registry::<serde_json::Value>::builder(MemoryFs::new())
///     .base_path("views")
///     .extension("txt")
///     .template_functions(FuncMap::new().string_filter("shout", |s| s.to_uppercase()))
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.template_path("home"), "views/home.txt");
/// ```
pub struct RegistryBuilder<T> {
    fs: Arc<dyn FileSystem>,
    config: RegistryConfig,
    shape: Option<Shape>,
    funcs: FuncMap,
    _data: PhantomData<fn(&T)>,
}

impl<T> RegistryBuilder<T> {
    pub(crate) fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            config: RegistryConfig::default(),
            shape: None,
            funcs: FuncMap::new(),
            _data: PhantomData,
        }
    }

    /// Directory holding the templates. An empty value keeps the default.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = base_path.into();
        self
    }

    /// Extension of template files, with or without the leading dot. An
    /// empty value keeps the default.
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    /// Replace both location settings at once.
    #[must_use]
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Check every template against `shape` before compiling it.
    #[must_use]
    pub fn validate_against(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Filters and functions available to every template.
    #[must_use]
    pub fn template_functions(mut self, funcs: FuncMap) -> Self {
        self.funcs = funcs;
        self
    }

    /// Build the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] when the base path is absolute or
    /// escapes the filesystem root, or the extension cannot name a file.
    pub fn build(self) -> Result<Registry<T>, ConstructionError> {
        let mut config = self.config;
        config.apply_defaults();
        config.validate()?;

        tracing::debug!(
            target: "templator::registry",
            "Building registry for '{}/*.{}' (validation: {}, functions: {})",
            config.base_path,
            config.extension,
            self.shape.is_some(),
            self.funcs.len()
        );

        Ok(Registry::from_parts(self.fs, config, self.shape, self.funcs))
    }
}

impl<T: Shaped> RegistryBuilder<T> {
    /// Check every template against the shape of `T` before compiling it.
    #[must_use]
    pub fn field_validation(self) -> Self {
        self.validate_against(T::shape())
    }
}
