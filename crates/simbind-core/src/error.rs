//! Error types for field access.

use std::error::Error;
use std::fmt;

/// Errors from field descriptors, views and aggregate layouts.
///
/// Every failing operation aborts before touching the aggregate: a
/// rejected write leaves the field exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// A write was attempted on a read-only field or view.
    ReadOnlyViolation {
        /// Name of the field.
        field: String,
    },
    /// An array write supplied the wrong number of elements.
    ShapeMismatch {
        /// Name of the field.
        field: String,
        /// Element count of the field.
        expected: usize,
        /// Element count of the source.
        actual: usize,
    },
    /// A descriptor was constructed for a type it cannot describe.
    InvalidShape {
        /// Name of the field.
        field: String,
        /// What is wrong with the shape.
        reason: String,
    },
    /// No field with this name is bound in the layout.
    UnknownField {
        /// The requested name.
        name: String,
    },
    /// The field exists but is of a different kind than the accessor used.
    KindMismatch {
        /// Name of the field.
        field: String,
        /// Kind the accessor expected.
        expected: &'static str,
        /// Kind the field actually has.
        actual: &'static str,
    },
    /// Two fields with the same name were bound into one layout.
    DuplicateField {
        /// The duplicated name.
        name: String,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnlyViolation { field } => {
                write!(f, "field '{field}' is read-only")
            }
            Self::ShapeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{field}' holds {expected} elements, source has {actual}"
            ),
            Self::InvalidShape { field, reason } => {
                write!(f, "invalid shape for field '{field}': {reason}")
            }
            Self::UnknownField { name } => write!(f, "no field named '{name}'"),
            Self::KindMismatch {
                field,
                expected,
                actual,
            } => write!(f, "field '{field}' is {actual}, not {expected}"),
            Self::DuplicateField { name } => write!(f, "field '{name}' bound twice"),
        }
    }
}

impl Error for FieldError {}
