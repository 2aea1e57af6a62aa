//! The [`SpaceModel`] trait shared by every space kind.

use std::fmt;

use simbind_core::DType;

use crate::error::SpaceError;
use crate::state::StateValue;

/// Common contract of the space descriptors.
///
/// Spaces are immutable values: construction validates them once, and
/// every other operation is a pure function of the descriptor. Equality is
/// structural (`PartialEq`) and the human-readable rendering is `Display`.
///
/// # Round trip
///
/// For every valid space `x`, `Self::from_state(&x.to_state())` succeeds
/// and yields a value equal to `x`.
pub trait SpaceModel: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync {
    /// Name of the space kind, as seen by the host (`"Discrete"`, ...).
    const NAME: &'static str;

    /// Number of items in the state tuple.
    const ARITY: usize;

    /// Element type of samples drawn from this space.
    fn dtype(&self) -> DType;

    /// Serialize to a state tuple of [`ARITY`](Self::ARITY) items.
    fn to_state(&self) -> Vec<StateValue>;

    /// Rebuild from a state tuple.
    ///
    /// Fails with [`SpaceError::InvalidState`] if the arity differs from
    /// [`ARITY`](Self::ARITY) or an item is of the wrong kind, and with the
    /// usual construction errors otherwise.
    fn from_state(state: &[StateValue]) -> Result<Self, SpaceError>;
}
