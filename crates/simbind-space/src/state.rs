//! Serialized space state.
//!
//! A space serializes to a short tuple of [`StateValue`]s, mirroring the
//! host's pickling protocol: `Discrete` → `(n,)`, `MultiDiscrete` →
//! `(nvec,)`, `MultiBinary` → `(n,)`, `Box` → `(low, high, shape)`.

use simbind_core::{Element, ElementBuffer};

use crate::error::SpaceError;

/// One item of a space's state tuple.
#[derive(Clone, Debug, PartialEq)]
pub enum StateValue {
    /// A single non-negative count (`n`).
    Count(u64),
    /// A list of non-negative counts (`nvec`, `shape`).
    Counts(Vec<u64>),
    /// A buffer of bound values (`low`, `high`).
    Elements(ElementBuffer),
}

impl StateValue {
    /// Kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::Counts(_) => "count list",
            Self::Elements(_) => "element buffer",
        }
    }

    /// State item for a list of extents.
    pub fn shape(extents: &[usize]) -> Self {
        Self::Counts(extents.iter().map(|&e| e as u64).collect())
    }

    /// State item for a list of bound values.
    pub fn elements<T: Element>(values: &[T]) -> Self {
        Self::Elements(ElementBuffer::from_slice(values))
    }
}

/// Reads a state tuple item by item, checking arity up front.
pub(crate) struct StateReader<'a> {
    space: &'static str,
    items: &'a [StateValue],
}

impl<'a> StateReader<'a> {
    pub(crate) fn new(
        space: &'static str,
        arity: usize,
        items: &'a [StateValue],
    ) -> Result<Self, SpaceError> {
        if items.len() != arity {
            return Err(SpaceError::InvalidState {
                space,
                reason: format!("expected {arity} items, got {}", items.len()),
            });
        }
        Ok(Self { space, items })
    }

    fn invalid(&self, index: usize, want: &str) -> SpaceError {
        SpaceError::InvalidState {
            space: self.space,
            reason: format!(
                "item {index} must be a {want}, got a {}",
                self.items[index].kind()
            ),
        }
    }

    pub(crate) fn count(&self, index: usize) -> Result<u64, SpaceError> {
        match &self.items[index] {
            StateValue::Count(n) => Ok(*n),
            _ => Err(self.invalid(index, "count")),
        }
    }

    pub(crate) fn counts(&self, index: usize) -> Result<Vec<u64>, SpaceError> {
        match &self.items[index] {
            StateValue::Counts(v) => Ok(v.clone()),
            _ => Err(self.invalid(index, "count list")),
        }
    }

    pub(crate) fn extents(&self, index: usize) -> Result<Vec<usize>, SpaceError> {
        self.counts(index)?
            .into_iter()
            .map(|e| {
                usize::try_from(e).map_err(|_| SpaceError::InvalidState {
                    space: self.space,
                    reason: format!("extent {e} does not fit in usize"),
                })
            })
            .collect()
    }

    /// Element buffer coerced to `T`, like the host's tuple cast.
    pub(crate) fn elements<T: Element>(&self, index: usize) -> Result<Vec<T>, SpaceError> {
        match &self.items[index] {
            StateValue::Elements(buffer) => {
                if buffer.dtype() != T::DTYPE {
                    tracing::trace!(
                        space = self.space,
                        from = %buffer.dtype(),
                        to = %T::DTYPE,
                        "coercing state buffer"
                    );
                }
                Ok(buffer.to_vec())
            }
            _ => Err(self.invalid(index, "element buffer")),
        }
    }
}
