//! Compiled templates bound to a data type.
//!
//! A [`Handler`] wraps one compiled template. Registries hand them out behind
//! an [`Arc`], so a handler is immutable once built; [`Handler::with_functions`]
//! returns a private copy instead of changing the shared one.
//!
//! Rendering is cancellable through a [`CancelContext`]. The context is
//! consulted before every write to the sink and once more after Tera returns,
//! and a finished context always wins over whatever error the engine or the
//! sink produced in the meantime.

use std::fmt;
use std::io::Write;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};

use crate::cancel::{CancelContext, ContextWriter};
use crate::core::{CompileError, ExecutionCause, ExecutionError};
use crate::functions::FuncMap;

/// A compiled template that renders values of type `T`.
pub struct Handler<T> {
    name: String,
    template_name: String,
    tera: Arc<Tera>,
    funcs: FuncMap,
    _data: PhantomData<fn(&T)>,
}

impl<T> Handler<T> {
    /// Compile `source` under `file_name`, with `funcs` available to it.
    ///
    /// Tera picks autoescaping from the file name, so `home.html` escapes
    /// output while `mail.txt` does not.
    pub(crate) fn compile(
        name: &str,
        file_name: &str,
        source: &str,
        funcs: &FuncMap,
    ) -> Result<Self, CompileError> {
        let mut tera = Tera::default();
        funcs.register(&mut tera);
        tera.add_raw_template(file_name, source).map_err(|source| CompileError {
            name: name.to_string(),
            source,
        })?;

        Ok(Self {
            name: name.to_string(),
            template_name: file_name.to_string(),
            tera: Arc::new(tera),
            funcs: funcs.clone(),
            _data: PhantomData,
        })
    }

    /// Logical name the handler was requested under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the template inside Tera, including the extension.
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Filters and functions available to the template.
    pub fn functions(&self) -> &FuncMap {
        &self.funcs
    }

    /// A copy of this handler with `funcs` added to its functions.
    ///
    /// Entries in `funcs` replace existing ones with the same name. The
    /// receiver, and every other holder of it, keeps its original set.
    #[must_use]
    pub fn with_functions(&self, funcs: &FuncMap) -> Self {
        let merged = self.funcs.merged(funcs);
        let mut tera = (*self.tera).clone();
        funcs.register(&mut tera);

        tracing::trace!(
            target: "templator::handler",
            "Extended '{}' with {} function(s)",
            self.name,
            funcs.len()
        );

        Self {
            name: self.name.clone(),
            template_name: self.template_name.clone(),
            tera: Arc::new(tera),
            funcs: merged,
            _data: PhantomData,
        }
    }

    fn fail(&self, cause: impl Into<ExecutionCause>) -> ExecutionError {
        ExecutionError::new(self.name.clone(), cause)
    }
}

impl<T: Serialize> Handler<T> {
    /// Render `data` into `writer`.
    ///
    /// Passing `None` as the context is rejected with
    /// [`ExecutionCause::NilContext`] before anything is written.
    ///
    /// # Errors
    ///
    /// - [`ExecutionCause::NilContext`] when no context was given
    /// - [`ExecutionCause::Context`] when the context was canceled or passed
    ///   its deadline, before or during rendering
    /// - [`ExecutionCause::Render`] when Tera failed, including failures of
    ///   `writer` itself
    ///
    /// Output already written before a failure stays in `writer`.
    pub fn render<W: Write>(
        &self,
        ctx: Option<&CancelContext>,
        writer: W,
        data: &T,
    ) -> Result<(), ExecutionError> {
        let Some(ctx) = ctx else {
            return Err(self.fail(ExecutionCause::NilContext));
        };
        if let Some(err) = ctx.err() {
            return Err(self.fail(err));
        }

        let context = match Context::from_serialize(data) {
            Ok(context) => context,
            Err(e) => return Err(self.fail(ctx.err().map_or(ExecutionCause::from(e), Into::into))),
        };

        let result = self
            .tera
            .render_to(&self.template_name, &context, ContextWriter::new(ctx, writer));

        if let Some(err) = ctx.err() {
            return Err(self.fail(err));
        }
        result.map_err(|e| self.fail(e))
    }

    /// Render `data` into a new string.
    pub fn render_to_string(
        &self,
        ctx: Option<&CancelContext>,
        data: &T,
    ) -> Result<String, ExecutionError> {
        let mut buffer = Vec::new();
        self.render(ctx, &mut buffer, data)?;
        String::from_utf8(buffer).map_err(|e| self.fail(tera::Error::msg(e.to_string())))
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            template_name: self.template_name.clone(),
            tera: Arc::clone(&self.tera),
            funcs: self.funcs.clone(),
            _data: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("template_name", &self.template_name)
            .field("functions", &self.funcs)
            .finish_non_exhaustive()
    }
}
