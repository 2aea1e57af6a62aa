//! Error types for space construction and reconstruction.

use std::fmt;

/// Errors arising from building a space or restoring one from its state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpaceError {
    /// A bound does not hold one value per element of the shape.
    ShapeMismatch {
        /// Which bound (`"low"` or `"high"`).
        what: &'static str,
        /// Element count implied by the shape.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// The shape itself is unusable.
    InvalidShape {
        /// What went wrong.
        reason: String,
    },
    /// A state tuple has the wrong arity or an unusable item.
    InvalidState {
        /// Name of the space kind being restored.
        space: &'static str,
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "shape mismatch: {what} has {actual} values, shape holds {expected}"
            ),
            Self::InvalidShape { reason } => write!(f, "invalid shape: {reason}"),
            Self::InvalidState { space, reason } => {
                write!(f, "invalid state for {space}: {reason}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
