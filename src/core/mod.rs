//! Core types shared by every templator module.
//!
//! - [`error`] holds the error taxonomy the library returns
//! - [`error_formatting`] turns those errors into reports for the command line

pub mod error;
pub mod error_formatting;

pub use error::{
    CompileError, ConstructionError, Error, ExecutionCause, ExecutionError, LookupError,
    ValidationError,
};
pub use error_formatting::{ErrorContext, user_friendly_error};
