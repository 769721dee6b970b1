//! Error types for templator
//!
//! The taxonomy mirrors the life of a template:
//!
//! - [`LookupError`] - the source file could not be found or read
//! - [`ValidationError`] - the source references a field the bound type lacks
//! - [`CompileError`] - Tera rejected the source
//! - [`ExecutionError`] - rendering failed, was canceled, or ran past its deadline
//! - [`ConstructionError`] - the registry options were rejected
//!
//! [`Error`] groups the three failures [`Registry::get`] can produce. None of
//! these are logged inside the crate; every error goes back to the caller, who
//! decides whether to retry.
//!
//! Every wrapper keeps its cause reachable through
//! [`std::error::Error::source`], so callers can walk down to the underlying
//! [`ContextError`] or [`tera::Error`].
//!
//! [`Registry::get`]: crate::registry::Registry::get

use std::io;

use thiserror::Error;

use crate::cancel::ContextError;
use crate::validation::FieldError;

/// Errors produced while resolving a template name into a handler.
#[derive(Debug, Error)]
pub enum Error {
    /// The template source could not be read.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The template references a field the bound type does not have.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The template engine rejected the source.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl Error {
    /// Name of the template the failure belongs to.
    pub fn template_name(&self) -> &str {
        match self {
            Error::Lookup(e) => e.name(),
            Error::Validation(e) => &e.template_name,
            Error::Compile(e) => &e.name,
        }
    }

    /// Whether this failure is a missing template file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Lookup(LookupError::NotFound { .. }))
    }
}

/// A named template source could not be read from the filesystem.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No file exists at the resolved path.
    #[error("template '{name}' not found")]
    NotFound {
        /// Logical template name as passed to `get`
        name: String,
        /// Resolved path inside the filesystem
        path: String,
    },

    /// The file exists but reading it failed.
    #[error("failed to read template '{name}' from '{path}'")]
    Read {
        /// Logical template name as passed to `get`
        name: String,
        /// Resolved path inside the filesystem
        path: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },
}

impl LookupError {
    /// Classify an I/O failure for the template `name` stored at `path`.
    pub fn from_io(name: impl Into<String>, path: impl Into<String>, source: io::Error) -> Self {
        let name = name.into();
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            LookupError::NotFound { name, path }
        } else {
            LookupError::Read { name, path, source }
        }
    }

    /// Logical template name.
    pub fn name(&self) -> &str {
        match self {
            LookupError::NotFound { name, .. } | LookupError::Read { name, .. } => name,
        }
    }

    /// Path that was looked up.
    pub fn path(&self) -> &str {
        match self {
            LookupError::NotFound { path, .. } | LookupError::Read { path, .. } => path,
        }
    }
}

/// A template references a field that does not resolve on the bound shape.
#[derive(Debug, Error)]
#[error("template '{template_name}' validation error: '{field_path}' - '{source}'")]
pub struct ValidationError {
    /// Template that failed validation
    pub template_name: String,
    /// Dotted field path as written in the template
    pub field_path: String,
    /// Why the path did not resolve
    #[source]
    pub source: FieldError,
}

/// Tera could not parse the template source.
#[derive(Debug, Error)]
#[error("failed to parse template '{name}'")]
pub struct CompileError {
    /// Logical template name
    pub name: String,
    /// Error reported by Tera
    #[source]
    pub source: tera::Error,
}

/// Rendering a compiled template failed.
#[derive(Debug, Error)]
#[error("failed to execute template '{name}': '{cause}'")]
pub struct ExecutionError {
    /// Logical template name
    pub name: String,
    /// The underlying reason
    #[source]
    pub cause: ExecutionCause,
}

impl ExecutionError {
    /// Create an execution error for `name`.
    pub fn new(name: impl Into<String>, cause: impl Into<ExecutionCause>) -> Self {
        Self {
            name: name.into(),
            cause: cause.into(),
        }
    }

    /// The underlying reason.
    pub fn cause(&self) -> &ExecutionCause {
        &self.cause
    }

    /// The cancellation reason, if rendering stopped because its context ended.
    pub fn context_error(&self) -> Option<ContextError> {
        match self.cause {
            ExecutionCause::Context(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.context_error() == Some(ContextError::Canceled)
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        self.context_error() == Some(ContextError::DeadlineExceeded)
    }

    pub fn is_nil_context(&self) -> bool {
        matches!(self.cause, ExecutionCause::NilContext)
    }
}

/// Reasons a render can fail.
#[derive(Debug, Error)]
pub enum ExecutionCause {
    /// `render` was called without a cancellation context.
    #[error("nil context")]
    NilContext,

    /// The cancellation context was canceled or passed its deadline.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Tera failed while rendering (missing variable, filter error, sink error).
    #[error("{0}")]
    Render(#[source] tera::Error),
}

impl From<tera::Error> for ExecutionCause {
    fn from(error: tera::Error) -> Self {
        ExecutionCause::Render(error)
    }
}

/// Registry options were rejected at construction time.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// The base path escapes the filesystem root.
    #[error("invalid template base path '{path}': {reason}")]
    InvalidBasePath {
        /// Path as configured
        path: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The extension cannot name a file.
    #[error("invalid template extension '{extension}'")]
    InvalidExtension {
        /// Extension as configured
        extension: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration in '{origin}': {message}")]
    Config {
        /// File path, or `<inline>` for strings
        origin: String,
        /// Parser or I/O message
        message: String,
    },
}
