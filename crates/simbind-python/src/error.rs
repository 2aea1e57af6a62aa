//! Core error -> Python exception mapping.
//!
//! Every error that crosses into Python goes through one of the
//! `*_err` functions below so that a given failure always raises the
//! same exception type.

use pyo3::exceptions::{PyAttributeError, PyKeyError, PyOSError, PyTypeError, PyValueError};
use pyo3::PyErr;
use simbind_core::FieldError;
use simbind_space::{ConfigError, SpaceError};

/// Python exception class an error is raised as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExceptionKind {
    Attribute,
    Key,
    OS,
    Type,
    Value,
}

impl ExceptionKind {
    fn raise(self, message: String) -> PyErr {
        match self {
            Self::Attribute => PyAttributeError::new_err(message),
            Self::Key => PyKeyError::new_err(message),
            Self::OS => PyOSError::new_err(message),
            Self::Type => PyTypeError::new_err(message),
            Self::Value => PyValueError::new_err(message),
        }
    }
}

pub(crate) fn field_exception(err: &FieldError) -> ExceptionKind {
    match err {
        // Assigning to a read-only property is an AttributeError in Python.
        FieldError::ReadOnlyViolation { .. } => ExceptionKind::Attribute,
        FieldError::UnknownField { .. } => ExceptionKind::Key,
        FieldError::KindMismatch { .. } => ExceptionKind::Type,
        FieldError::ShapeMismatch { .. }
        | FieldError::InvalidShape { .. }
        | FieldError::DuplicateField { .. } => ExceptionKind::Value,
    }
}

pub(crate) fn space_exception(_err: &SpaceError) -> ExceptionKind {
    ExceptionKind::Value
}

pub(crate) fn config_exception(err: &ConfigError) -> ExceptionKind {
    match err {
        ConfigError::Io { .. } => ExceptionKind::OS,
        ConfigError::Parse(_)
        | ConfigError::UnknownDtype(_)
        | ConfigError::InvalidBound { .. }
        | ConfigError::Space(_) => ExceptionKind::Value,
    }
}

/// Raise a [`FieldError`] as its Python exception.
pub(crate) fn field_err(err: FieldError) -> PyErr {
    field_exception(&err).raise(err.to_string())
}

/// Raise a [`SpaceError`] as its Python exception.
pub(crate) fn space_err(err: SpaceError) -> PyErr {
    space_exception(&err).raise(err.to_string())
}

/// Raise a [`ConfigError`] as its Python exception.
pub(crate) fn config_err(err: ConfigError) -> PyErr {
    config_exception(&err).raise(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simbind_core::DType;

    #[test]
    fn read_only_fields_raise_attribute_error() {
        let err = FieldError::ReadOnlyViolation {
            field: "tick".into(),
        };
        assert_eq!(field_exception(&err), ExceptionKind::Attribute);
    }

    #[test]
    fn field_lookup_and_kind_errors() {
        let unknown = FieldError::UnknownField {
            name: "nope".into(),
        };
        assert_eq!(field_exception(&unknown), ExceptionKind::Key);
        let kind = FieldError::KindMismatch {
            field: "gain".into(),
            expected: "array",
            actual: "scalar",
        };
        assert_eq!(field_exception(&kind), ExceptionKind::Type);
    }

    #[test]
    fn shape_problems_raise_value_error() {
        let err = FieldError::ShapeMismatch {
            field: "inputs".into(),
            expected: 4,
            actual: 3,
        };
        assert_eq!(field_exception(&err), ExceptionKind::Value);
        let err = SpaceError::InvalidState {
            space: "Discrete",
            reason: "expected 1 items, got 2".into(),
        };
        assert_eq!(space_exception(&err), ExceptionKind::Value);
    }

    #[test]
    fn config_errors_split_io_from_content() {
        let io = ConfigError::Io {
            path: "missing.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(config_exception(&io), ExceptionKind::OS);
        let bound = ConfigError::InvalidBound {
            dtype: DType::U8,
            value: "300".into(),
            reason: "out of range",
        };
        assert_eq!(config_exception(&bound), ExceptionKind::Value);
    }
}
