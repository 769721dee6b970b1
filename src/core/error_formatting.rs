//! User-facing error reports for the command line.
//!
//! [`user_friendly_error`] walks an [`anyhow::Error`] chain looking for the
//! crate's own error types and attaches a suggestion that fits the failure.
//! The library itself never prints; only the binary calls
//! [`ErrorContext::display`].

use std::error::Error as StdError;
use std::fmt;
use std::io;

use colored::Colorize;

use super::error::{
    CompileError, ConstructionError, Error, ExecutionError, LookupError, ValidationError,
};

/// An error message with optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// Top-level message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional extra information, usually the underlying cause
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the report to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Turn an error into a report with a suggestion where one applies.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let context = ErrorContext::new(error.to_string());
    let details = cause_chain(error.as_ref());

    let mut current: Option<&(dyn StdError + 'static)> = Some(error.as_ref());
    while let Some(err) = current {
        if let Some(suggestion) = suggestion_for(err) {
            let context = context.with_suggestion(suggestion);
            return match details {
                Some(details) => context.with_details(details),
                None => context,
            };
        }
        current = err.source();
    }

    match details {
        Some(details) => context.with_details(details),
        None => context,
    }
}

fn suggestion_for(err: &(dyn StdError + 'static)) -> Option<String> {
    // `Error` is transparent, so its variants never show up as sources.
    if let Some(e) = err.downcast_ref::<Error>() {
        return match e {
            Error::Lookup(e) => suggestion_for(e),
            Error::Validation(e) => suggestion_for(e),
            Error::Compile(e) => suggestion_for(e),
        };
    }
    if let Some(e) = err.downcast_ref::<LookupError>() {
        return Some(match e {
            LookupError::NotFound { path, .. } => {
                format!("Check that '{path}' exists, or pass --dir to point at another root")
            }
            LookupError::Read { .. } => {
                "Check the file's permissions and that it is valid UTF-8".to_string()
            }
        });
    }
    if let Some(e) = err.downcast_ref::<ValidationError>() {
        return Some(format!(
            "Add '{}' to the data type or remove the reference from '{}'",
            e.field_path, e.template_name
        ));
    }
    if err.downcast_ref::<CompileError>().is_some() {
        return Some("Fix the template syntax reported in the details".to_string());
    }
    if let Some(e) = err.downcast_ref::<ExecutionError>() {
        return Some(if e.is_deadline_exceeded() {
            "Raise --timeout-ms or simplify the template".to_string()
        } else {
            "Check that the data file provides every value the template uses".to_string()
        });
    }
    if err.downcast_ref::<ConstructionError>().is_some() {
        return Some("Use a relative base path and a plain file extension".to_string());
    }
    if err.downcast_ref::<serde_json::Error>().is_some() {
        return Some("The data file must contain a JSON object".to_string());
    }
    if let Some(e) = err.downcast_ref::<io::Error>() {
        return match e.kind() {
            io::ErrorKind::NotFound => {
                Some("Check that the file or directory exists and the path is correct".to_string())
            }
            io::ErrorKind::PermissionDenied => Some("Check the file's permissions".to_string()),
            _ => None,
        };
    }
    None
}

fn cause_chain(err: &(dyn StdError + 'static)) -> Option<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    if causes.is_empty() { None } else { Some(causes.join(": ")) }
}
