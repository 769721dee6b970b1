//! Arguments and helpers shared by the subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::config::RegistryConfig;
use crate::constants::CONFIG_FILE_NAME;
use crate::fs::DirFs;
use crate::registry::{Registry, RegistryBuilder};

/// Where to find templates.
#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Root directory; templates live in its base path.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Configuration file. Defaults to `<DIR>/templator.toml` when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl TemplateArgs {
    /// Load the registry configuration for these arguments.
    pub fn load_config(&self) -> Result<RegistryConfig> {
        let config = match &self.config {
            Some(path) => RegistryConfig::load(path)?,
            None => RegistryConfig::load_or_default(&self.dir.join(CONFIG_FILE_NAME))?,
        };
        Ok(config)
    }

    /// A registry builder over `dir` with the loaded configuration.
    pub fn registry_builder<T>(&self) -> Result<RegistryBuilder<T>> {
        if !self.dir.is_dir() {
            anyhow::bail!("template root '{}' is not a directory", self.dir.display());
        }
        let config = self.load_config()?;
        Ok(Registry::builder(DirFs::new(&self.dir)).config(config))
    }
}

/// Read a JSON file.
pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse data file '{}'", path.display()))
}
