//! Registry configuration.
//!
//! [`RegistryConfig`] holds the settings that decide where a registry looks
//! for template sources. It can be built in code, through the registry
//! builder, or read from a `templator.toml` file:
//!
//! ```toml
//! # Directory inside the filesystem that holds the templates
//! base_path = "views"
//!
//! # Extension appended to logical template names
//! extension = "html.tera"
//! ```
//!
//! Missing keys fall back to the defaults in [`crate::constants`]. Values are
//! checked by [`RegistryConfig::validate`] when a registry is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TEMPLATE_DIR, DEFAULT_TEMPLATE_EXT};
use crate::core::ConstructionError;
use crate::fs;

/// Where template sources live inside a filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Directory, relative to the filesystem root, holding the templates.
    ///
    /// Default: `templates`
    pub base_path: String,

    /// Extension appended to logical names, without the leading dot.
    ///
    /// Default: `html`
    pub extension: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_TEMPLATE_DIR.to_string(),
            extension: DEFAULT_TEMPLATE_EXT.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConstructionError> {
        Self::parse(content, "<inline>")
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConstructionError> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConstructionError::Config {
            origin: origin.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &origin)
    }

    /// Read `path` if it exists, otherwise use the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConstructionError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(
                target: "templator::config",
                "No configuration at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConstructionError> {
        let mut config: Self = toml::from_str(content).map_err(|e| ConstructionError::Config {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        config.apply_defaults();
        Ok(config)
    }

    /// Replace empty values with the defaults.
    pub(crate) fn apply_defaults(&mut self) {
        if self.base_path.is_empty() {
            self.base_path = DEFAULT_TEMPLATE_DIR.to_string();
        }
        if self.extension.is_empty() {
            self.extension = DEFAULT_TEMPLATE_EXT.to_string();
        } else {
            let trimmed = self.extension.trim_start_matches('.');
            if !trimmed.is_empty() {
                self.extension = trimmed.to_string();
            }
        }
    }

    /// Check that the settings can address files inside the filesystem.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.base_path.starts_with(['/', '\\']) || Path::new(&self.base_path).is_absolute() {
            return Err(ConstructionError::InvalidBasePath {
                path: self.base_path.clone(),
                reason: "absolute paths are not allowed",
            });
        }
        if fs::clean_path(&self.base_path).is_err() {
            return Err(ConstructionError::InvalidBasePath {
                path: self.base_path.clone(),
                reason: "'..' segments are not allowed",
            });
        }
        if self.extension.is_empty()
            || self.extension.chars().all(|c| c == '.')
            || self.extension.contains(['/', '\\'])
        {
            return Err(ConstructionError::InvalidExtension {
                extension: self.extension.clone(),
            });
        }
        Ok(())
    }

    /// File name for a logical template name: `about/team` → `about/team.html`.
    pub fn file_name(&self, name: &str) -> String {
        format!("{name}.{}", self.extension)
    }

    /// Path of a logical template name inside the filesystem.
    pub fn template_path(&self, name: &str) -> String {
        fs::join(&self.base_path, &self.file_name(name))
    }

    /// Logical name for a path produced by walking the base path, if it carries
    /// the configured extension.
    pub fn logical_name(&self, path: &str) -> Option<String> {
        let base = fs::clean_path(&self.base_path).ok()?;
        let relative = if base.is_empty() {
            path
        } else {
            path.strip_prefix(&base)?.strip_prefix('/')?
        };
        let suffix = format!(".{}", self.extension);
        relative
            .strip_suffix(&suffix)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
