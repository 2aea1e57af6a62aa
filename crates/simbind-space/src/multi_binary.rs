//! `MultiBinary`: fixed-length vectors of zeros and ones.

use std::fmt;

use simbind_core::DType;

use crate::error::SpaceError;
use crate::model::SpaceModel;
use crate::state::{StateReader, StateValue};

/// The set `{0, 1}^n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MultiBinary {
    n: u64,
}

impl MultiBinary {
    /// Space of `n` binary flags.
    pub fn new(n: u64) -> Self {
        Self { n }
    }

    /// Number of flags.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Returns `true` if `x` has exactly `n` entries, each 0 or 1.
    pub fn contains(&self, x: &[i64]) -> bool {
        x.len() as u64 == self.n && x.iter().all(|&v| v == 0 || v == 1)
    }
}

impl SpaceModel for MultiBinary {
    const NAME: &'static str = "MultiBinary";
    const ARITY: usize = 1;

    /// Flags are stored as `uint8`; hosts with a boolean dtype use that.
    fn dtype(&self) -> DType {
        DType::U8
    }

    fn to_state(&self) -> Vec<StateValue> {
        vec![StateValue::Count(self.n)]
    }

    fn from_state(state: &[StateValue]) -> Result<Self, SpaceError> {
        let reader = StateReader::new(Self::NAME, Self::ARITY, state)?;
        Ok(Self::new(reader.count(0)?))
    }
}

impl fmt::Display for MultiBinary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiBinary({})", self.n)
    }
}
