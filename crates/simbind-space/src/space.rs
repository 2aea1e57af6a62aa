//! The closed sum of all space kinds.

use std::fmt;

use simbind_core::{DType, ElementSlice};

use crate::boxed::AnyBox;
use crate::discrete::Discrete;
use crate::error::SpaceError;
use crate::model::SpaceModel;
use crate::multi_binary::MultiBinary;
use crate::multi_discrete::MultiDiscrete;
use crate::state::StateValue;

/// Which kind of space, with the element type for boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    /// [`Discrete`].
    Discrete,
    /// [`MultiDiscrete`].
    MultiDiscrete,
    /// [`MultiBinary`].
    MultiBinary,
    /// [`AnyBox`] of the given element type.
    Box(DType),
}

impl SpaceKind {
    /// Name of the space kind, as seen by the host.
    pub fn name(self) -> &'static str {
        match self {
            Self::Discrete => Discrete::NAME,
            Self::MultiDiscrete => MultiDiscrete::NAME,
            Self::MultiBinary => MultiBinary::NAME,
            Self::Box(_) => "Box",
        }
    }
}

/// A candidate member passed to [`Space::contains`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample<'a> {
    /// A single integer, for [`Discrete`].
    Index(i64),
    /// A vector of integers, for [`MultiDiscrete`] and [`MultiBinary`].
    Indices(&'a [i64]),
    /// A shaped buffer, for boxes.
    Elements {
        /// The values, row-major.
        data: ElementSlice<'a>,
        /// Per-dimension extents of `data`.
        shape: &'a [usize],
    },
}

/// Any space descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum Space {
    /// Integers in `[0, n)`.
    Discrete(Discrete),
    /// Product of discrete ranges.
    MultiDiscrete(MultiDiscrete),
    /// Binary vectors.
    MultiBinary(MultiBinary),
    /// Per-element intervals over a shaped buffer.
    Box(AnyBox),
}

impl Space {
    /// Kind of this space.
    pub fn kind(&self) -> SpaceKind {
        match self {
            Self::Discrete(_) => SpaceKind::Discrete,
            Self::MultiDiscrete(_) => SpaceKind::MultiDiscrete,
            Self::MultiBinary(_) => SpaceKind::MultiBinary,
            Self::Box(b) => SpaceKind::Box(b.dtype()),
        }
    }

    /// Element type of samples drawn from this space.
    pub fn dtype(&self) -> DType {
        match self {
            Self::Discrete(s) => s.dtype(),
            Self::MultiDiscrete(s) => s.dtype(),
            Self::MultiBinary(s) => s.dtype(),
            Self::Box(b) => b.dtype(),
        }
    }

    /// Membership test.
    ///
    /// A sample of the wrong kind for this space is not a member; this
    /// never fails.
    pub fn contains(&self, sample: Sample<'_>) -> bool {
        match (self, sample) {
            (Self::Discrete(s), Sample::Index(x)) => s.contains(x),
            (Self::MultiDiscrete(s), Sample::Indices(x)) => s.contains(x),
            (Self::MultiBinary(s), Sample::Indices(x)) => s.contains(x),
            (Self::Box(b), Sample::Elements { data, shape }) => b.contains(data, shape),
            _ => false,
        }
    }

    /// Serialize to a state tuple.
    pub fn to_state(&self) -> Vec<StateValue> {
        match self {
            Self::Discrete(s) => s.to_state(),
            Self::MultiDiscrete(s) => s.to_state(),
            Self::MultiBinary(s) => s.to_state(),
            Self::Box(b) => b.to_state(),
        }
    }

    /// Rebuild a space of the given kind from its state tuple.
    pub fn from_state(kind: SpaceKind, state: &[StateValue]) -> Result<Self, SpaceError> {
        Ok(match kind {
            SpaceKind::Discrete => Self::Discrete(Discrete::from_state(state)?),
            SpaceKind::MultiDiscrete => Self::MultiDiscrete(MultiDiscrete::from_state(state)?),
            SpaceKind::MultiBinary => Self::MultiBinary(MultiBinary::from_state(state)?),
            SpaceKind::Box(dtype) => Self::Box(AnyBox::from_state(dtype, state)?),
        })
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discrete(s) => fmt::Display::fmt(s, f),
            Self::MultiDiscrete(s) => fmt::Display::fmt(s, f),
            Self::MultiBinary(s) => fmt::Display::fmt(s, f),
            Self::Box(b) => fmt::Display::fmt(b, f),
        }
    }
}

impl From<Discrete> for Space {
    fn from(space: Discrete) -> Self {
        Self::Discrete(space)
    }
}

impl From<MultiDiscrete> for Space {
    fn from(space: MultiDiscrete) -> Self {
        Self::MultiDiscrete(space)
    }
}

impl From<MultiBinary> for Space {
    fn from(space: MultiBinary) -> Self {
        Self::MultiBinary(space)
    }
}

impl From<AnyBox> for Space {
    fn from(space: AnyBox) -> Self {
        Self::Box(space)
    }
}
