//! Static validation of template field references.
//!
//! Validation runs in two steps, before a template is compiled:
//!
//! 1. [`extract_field_paths`] scans the source for top-level field references
//! 2. [`validate_field`] resolves each path against the [`Shape`] of the
//!    registry's data type
//!
//! [`validate_template`] combines both and reports the first path that does
//! not resolve as a [`ValidationError`].
//!
//! [`Shape`]: crate::shape::Shape
//! [`ValidationError`]: crate::core::ValidationError

pub mod extractor;
pub mod validator;

pub use extractor::{FieldPath, extract_field_paths};
pub use validator::{FieldError, validate_field, validate_template};
