//! Field path resolution against a [`Shape`].

use thiserror::Error;

use super::extractor::{FieldPath, extract_field_paths};
use crate::core::ValidationError;
use crate::shape::Shape;

/// Why a field path does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The bound type has no structure at all.
    #[error("nil type")]
    NilType,

    /// A segment was applied to something that has no fields.
    #[error("expected record type, got {kind} ({type_name})")]
    NotRecord {
        kind: &'static str,
        type_name: String,
    },

    /// The record has no field with this name.
    #[error("field '{segment}' not found in type {type_name}")]
    NotFound { segment: String, type_name: String },
}

/// Check that `path` resolves on `shape`.
///
/// Each step removes one level of optionality before looking up the next
/// segment, so `Option<Author>` exposes the fields of `Author`. A
/// [`Shape::Dynamic`] value accepts whatever follows it.
pub fn validate_field(shape: &Shape, path: &FieldPath) -> Result<(), FieldError> {
    if matches!(shape, Shape::Unit) {
        return Err(FieldError::NilType);
    }

    let mut current = shape;
    for segment in path.segments() {
        current = current.unwrap_optional();
        let record = match current {
            Shape::Record(record) => record,
            Shape::Dynamic => return Ok(()),
            Shape::Unit => return Err(FieldError::NilType),
            other => {
                return Err(FieldError::NotRecord {
                    kind: other.kind(),
                    type_name: other.type_name(),
                });
            }
        };
        let field = record.field(segment).ok_or_else(|| FieldError::NotFound {
            segment: segment.to_string(),
            type_name: record.name().to_string(),
        })?;
        current = field.shape();
    }
    Ok(())
}

/// Check every field `source` references against `shape`.
///
/// Stops at the first path that does not resolve.
pub fn validate_template(name: &str, source: &str, shape: &Shape) -> Result<(), ValidationError> {
    for path in extract_field_paths(source) {
        validate_field(shape, &path).map_err(|source| ValidationError {
            template_name: name.to_string(),
            field_path: path.to_string(),
            source,
        })?;
    }
    Ok(())
}
