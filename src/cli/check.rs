//! Compile every template in a directory.
//!
//! `check` discovers the templates below the base path and resolves each one
//! through a registry, so lookups, validation and compilation are exercised
//! exactly as an application would. With `--data`, the field references of
//! every template are also checked against the structure of a JSON sample.
//!
//! ```text
//! ✓ about/team
//! ✗ home: template 'home' validation error: 'Title' - 'field 'Title' not found in type Data'
//!
//! 1 of 2 template(s) failed
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use super::common::{TemplateArgs, read_json};
use crate::shape::Shape;

/// Output format for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Discover and compile every template.
#[derive(Args, Debug)]
pub struct CheckCommand {
    #[command(flatten)]
    pub templates: TemplateArgs,

    /// JSON sample whose structure every template must match
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    valid: bool,
    checked: usize,
    errors: Vec<TemplateFailure>,
}

#[derive(Debug, Serialize)]
struct TemplateFailure {
    template: String,
    error: String,
}

impl CheckCommand {
    pub fn execute(self) -> Result<()> {
        let report = self.run()?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text if report.checked == 0 => {
                println!("{} No templates found", "⚠".yellow());
            }
            OutputFormat::Text => {
                if report.valid {
                    println!("{} {} template(s) compiled", "✓".green(), report.checked);
                } else {
                    println!();
                }
            }
        }

        if !report.valid {
            anyhow::bail!("{} of {} template(s) failed", report.errors.len(), report.checked);
        }
        Ok(())
    }

    fn run(&self) -> Result<CheckReport> {
        let mut builder = self.templates.registry_builder::<serde_json::Value>()?;
        if let Some(path) = &self.data {
            let sample = read_json(path)?;
            builder = builder.validate_against(Shape::from_json_sample("Data", &sample));
        }
        let registry = builder.build()?;

        let names = registry.discover()?;
        let text = self.format == OutputFormat::Text;
        let mut errors = Vec::new();

        for name in &names {
            match registry.get(name) {
                Ok(_) => {
                    if text {
                        println!("{} {}", "✓".green(), name);
                    }
                }
                Err(e) => {
                    let error = error_chain(&e);
                    if text {
                        println!("{} {}: {}", "✗".red(), name, error);
                    }
                    errors.push(TemplateFailure {
                        template: name.clone(),
                        error,
                    });
                }
            }
        }

        tracing::debug!(
            target: "templator::cli",
            "Checked {} template(s), {} failure(s)",
            names.len(),
            errors.len()
        );

        Ok(CheckReport {
            valid: errors.is_empty(),
            checked: names.len(),
            errors,
        })
    }
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        current = cause.source();
    }
    message
}
