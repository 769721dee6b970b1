//! Command-line interface for templator.
//!
//! The binary is a thin layer over the library: it builds a registry over a
//! directory on disk and either compiles every template it finds or renders
//! one of them with JSON data.
//!
//! # Commands
//!
//! - `check` - discover and compile every template, reporting each failure
//! - `render` - render one template with data from a JSON file to stdout
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Disable logging; only results and errors are printed
//!
//! # Examples
//!
//! ```bash
//! templator check --dir site
//! templator check --dir site --data sample.json --format json
//! templator --verbose render home --dir site --data home.json --timeout-ms 500
//! ```
//!
//! Templates are read from `<dir>/<base_path>/<name>.<extension>`. The
//! location settings come from `--config`, or from `<dir>/templator.toml`
//! when that file exists.

mod check;
mod common;
mod render;

pub use check::{CheckCommand, OutputFormat};
pub use common::TemplateArgs;
pub use render::RenderCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default tracing filter. `None` disables logging unless `RUST_LOG` is
    /// set.
    pub log_level: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Calling this
    /// again after a subscriber is installed has no effect.
    pub fn init_logging(&self) {
        let filter = match (&self.log_level, EnvFilter::try_from_default_env()) {
            (_, Ok(from_env)) => from_env,
            (Some(level), Err(_)) => EnvFilter::new(level),
            (None, Err(_)) => return,
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    }
}

/// Validate and render Tera templates.
#[derive(Parser)]
#[command(
    name = "templator",
    about = "Validate and render Tera templates",
    version,
    long_about = "templator compiles a directory of Tera templates, optionally checks their \
                  field references against sample data, and renders them with JSON input."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging. Results and errors are still printed.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every template under the template directory.
    Check(CheckCommand),

    /// Render one template to stdout.
    Render(RenderCommand),
}

impl Cli {
    /// Run the parsed command.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig { log_level }
    }

    /// Run the parsed command with an explicit configuration.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Check(cmd) => cmd.execute(),
            Commands::Render(cmd) => cmd.execute(),
        }
    }
}
