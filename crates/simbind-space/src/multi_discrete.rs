//! `MultiDiscrete`: a Cartesian product of `Discrete` spaces.

use std::fmt;

use simbind_core::DType;

use crate::error::SpaceError;
use crate::model::SpaceModel;
use crate::state::{StateReader, StateValue};

/// Vectors `x` with `0 <= x[i] < nvec[i]` for every `i`.
///
/// The length of `nvec` is the dimensionality; it may be zero.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MultiDiscrete {
    nvec: Vec<u64>,
}

impl MultiDiscrete {
    /// Space with `nvec[i]` choices along dimension `i`.
    pub fn new(nvec: impl Into<Vec<u64>>) -> Self {
        Self { nvec: nvec.into() }
    }

    /// Number of choices per dimension.
    pub fn nvec(&self) -> &[u64] {
        &self.nvec
    }

    /// Returns `true` if `x` has one in-range entry per dimension.
    ///
    /// A length mismatch is not an error; it is simply not a member.
    pub fn contains(&self, x: &[i64]) -> bool {
        x.len() == self.nvec.len()
            && x
                .iter()
                .zip(&self.nvec)
                .all(|(&v, &n)| u64::try_from(v).is_ok_and(|v| v < n))
    }
}

impl SpaceModel for MultiDiscrete {
    const NAME: &'static str = "MultiDiscrete";
    const ARITY: usize = 1;

    fn dtype(&self) -> DType {
        DType::U64
    }

    fn to_state(&self) -> Vec<StateValue> {
        vec![StateValue::Counts(self.nvec.clone())]
    }

    fn from_state(state: &[StateValue]) -> Result<Self, SpaceError> {
        let reader = StateReader::new(Self::NAME, Self::ARITY, state)?;
        Ok(Self::new(reader.counts(0)?))
    }
}

impl fmt::Display for MultiDiscrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiDiscrete({:?})", self.nvec)
    }
}
