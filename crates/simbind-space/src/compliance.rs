//! SpaceModel contract test helpers.
//!
//! Shared by the test modules of every space kind.

use crate::error::SpaceError;
use crate::model::SpaceModel;
use crate::state::StateValue;

/// Assert that `from_state(to_state(x)) == x` and that the state has
/// exactly `ARITY` items.
pub fn assert_round_trip<S: SpaceModel>(space: &S) {
    let state = space.to_state();
    assert_eq!(
        state.len(),
        S::ARITY,
        "{} state has {} items, expected {}",
        S::NAME,
        state.len(),
        S::ARITY
    );
    let restored = S::from_state(&state)
        .unwrap_or_else(|e| panic!("{space} failed to restore from its own state: {e}"));
    assert_eq!(&restored, space, "{space} did not survive a state round trip");
    assert_eq!(restored.to_string(), space.to_string());
}

/// Assert that a state with one item too many or too few is
/// [`SpaceError::InvalidState`].
pub fn assert_rejects_wrong_arity<S: SpaceModel>(space: &S) {
    let mut long = space.to_state();
    long.push(StateValue::Count(0));
    assert!(
        matches!(S::from_state(&long), Err(SpaceError::InvalidState { .. })),
        "{} accepted {} state items",
        S::NAME,
        long.len()
    );

    let mut short = space.to_state();
    short.pop();
    assert!(
        matches!(S::from_state(&short), Err(SpaceError::InvalidState { .. })),
        "{} accepted {} state items",
        S::NAME,
        short.len()
    );
}

/// Assert reflexivity, symmetry and transitivity of `==` on three values
/// that are expected to be equal.
pub fn assert_eq_laws<S: SpaceModel>(a: &S, b: &S, c: &S) {
    assert_eq!(a, a, "{a} is not equal to itself");
    assert_eq!(a == b, b == a, "equality of {a} and {b} is not symmetric");
    if a == b && b == c {
        assert_eq!(a, c, "equality of {a}, {b}, {c} is not transitive");
    }
}
