//! Render one template to stdout.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use super::common::{TemplateArgs, read_json};
use crate::cancel::CancelContext;

/// Render a template with JSON data.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Logical template name, e.g. `about/team`
    pub name: String,

    #[command(flatten)]
    pub templates: TemplateArgs,

    /// JSON object to render with. Defaults to an empty object.
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Abort rendering after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl RenderCommand {
    pub fn execute(self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.render_to(&mut out)?;
        out.flush()?;
        Ok(())
    }

    fn render_to<W: Write>(&self, out: W) -> Result<()> {
        let registry = self.templates.registry_builder::<serde_json::Value>()?.build()?;
        let handler = registry.get(&self.name)?;

        let data = match &self.data {
            Some(path) => read_json(path)?,
            None => serde_json::Value::Object(serde_json::Map::new()),
        };

        let background = CancelContext::background();
        let (ctx, _canceler) = match self.timeout_ms {
            Some(ms) => background.with_timeout(Duration::from_millis(ms)),
            None => background.with_cancel(),
        };

        tracing::debug!(
            target: "templator::cli",
            "Rendering '{}' (deadline: {:?})",
            self.name,
            ctx.deadline()
        );
        handler.render(Some(&ctx), out, &data)?;
        Ok(())
    }
}
