//! `Discrete`: integers in `[0, n)`.

use std::fmt;

use simbind_core::DType;

use crate::error::SpaceError;
use crate::model::SpaceModel;
use crate::state::{StateReader, StateValue};

/// The integers `0, 1, ..., n - 1`.
///
/// `n == 0` is legal and describes the empty set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Discrete {
    n: u64,
}

impl Discrete {
    /// Space of `n` choices.
    pub fn new(n: u64) -> Self {
        Self { n }
    }

    /// Number of choices.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Returns `true` if `0 <= x < n`.
    pub fn contains(&self, x: i64) -> bool {
        u64::try_from(x).is_ok_and(|x| x < self.n)
    }
}

impl SpaceModel for Discrete {
    const NAME: &'static str = "Discrete";
    const ARITY: usize = 1;

    fn dtype(&self) -> DType {
        DType::U64
    }

    fn to_state(&self) -> Vec<StateValue> {
        vec![StateValue::Count(self.n)]
    }

    fn from_state(state: &[StateValue]) -> Result<Self, SpaceError> {
        let reader = StateReader::new(Self::NAME, Self::ARITY, state)?;
        Ok(Self::new(reader.count(0)?))
    }
}

impl fmt::Display for Discrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discrete({})", self.n)
    }
}
