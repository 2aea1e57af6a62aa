//! Proptest strategies for spaces and their members.
//!
//! Bounds are kept small and finite so that generated Box spaces always
//! have `low <= high` and a member can be drawn from every one of them.

use proptest::collection::vec;
use proptest::prelude::*;
use simbind_space::{AnyBox, BoxSpace, Discrete, MultiBinary, MultiDiscrete, Space};

/// Box shapes of rank 1 to 3 with small extents.
pub fn arb_shape() -> impl Strategy<Value = Vec<usize>> {
    vec(1usize..4, 1..4)
}

pub fn arb_discrete() -> impl Strategy<Value = Discrete> {
    (0u64..64).prop_map(Discrete::new)
}

pub fn arb_multi_discrete() -> impl Strategy<Value = MultiDiscrete> {
    vec(1u64..16, 0..6).prop_map(MultiDiscrete::new)
}

pub fn arb_multi_binary() -> impl Strategy<Value = MultiBinary> {
    (0u64..32).prop_map(MultiBinary::new)
}

fn size_of(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// A float Box with per-element bounds and `low <= high`.
pub fn arb_box_f64() -> impl Strategy<Value = BoxSpace<f64>> {
    arb_shape().prop_flat_map(|shape| {
        let n = size_of(&shape);
        vec((-1.0e3f64..1.0e3, 0.0f64..1.0e3), n).prop_map(move |bounds| {
            let (low, high): (Vec<f64>, Vec<f64>) =
                bounds.iter().map(|&(lo, w)| (lo, lo + w)).unzip();
            BoxSpace::new(low, high, &shape).expect("bounds are generated per element")
        })
    })
}

/// An integer Box with per-element bounds and `low <= high`.
pub fn arb_box_i32() -> impl Strategy<Value = BoxSpace<i32>> {
    arb_shape().prop_flat_map(|shape| {
        let n = size_of(&shape);
        vec((-100i32..100, 0i32..50), n).prop_map(move |bounds| {
            let (low, high): (Vec<i32>, Vec<i32>) =
                bounds.iter().map(|&(lo, w)| (lo, lo + w)).unzip();
            BoxSpace::new(low, high, &shape).expect("bounds are generated per element")
        })
    })
}

/// Any space, covering every kind and two Box element types.
pub fn arb_space() -> impl Strategy<Value = Space> {
    prop_oneof![
        arb_discrete().prop_map(Space::from),
        arb_multi_discrete().prop_map(Space::from),
        arb_multi_binary().prop_map(Space::from),
        arb_box_f64().prop_map(|b| Space::Box(AnyBox::from(b))),
        arb_box_i32().prop_map(|b| Space::Box(AnyBox::from(b))),
    ]
}

// ── Members ─────────────────────────────────────────────────────────

/// A non-empty Discrete space together with one of its members.
pub fn discrete_with_member() -> impl Strategy<Value = (Discrete, i64)> {
    (1u64..64).prop_flat_map(|n| (Just(Discrete::new(n)), 0..n as i64))
}

pub fn multi_discrete_with_member() -> impl Strategy<Value = (MultiDiscrete, Vec<i64>)> {
    vec(1u64..16, 0..6).prop_flat_map(|nvec| {
        let member: Vec<_> = nvec.iter().map(|&n| 0..n as i64).collect();
        (Just(MultiDiscrete::new(nvec)), member)
    })
}

pub fn multi_binary_with_member() -> impl Strategy<Value = (MultiBinary, Vec<i64>)> {
    (0u64..32).prop_flat_map(|n| (Just(MultiBinary::new(n)), vec(0i64..=1, n as usize)))
}

/// A float Box with one member; each element is placed anywhere within
/// its interval, endpoints included.
pub fn box_f64_with_member() -> impl Strategy<Value = (BoxSpace<f64>, Vec<f64>)> {
    arb_box_f64().prop_flat_map(|space| {
        let n = space.size();
        (Just(space), vec(0.0f64..=1.0, n)).prop_map(|(space, t)| {
            let member = space
                .low()
                .iter()
                .zip(space.high())
                .zip(t)
                .map(|((&lo, &hi), t)| (lo + t * (hi - lo)).clamp(lo, hi))
                .collect();
            (space, member)
        })
    })
}

pub fn box_i32_with_member() -> impl Strategy<Value = (BoxSpace<i32>, Vec<i32>)> {
    arb_box_i32().prop_flat_map(|space| {
        let member: Vec<_> = space
            .low()
            .iter()
            .zip(space.high())
            .map(|(&lo, &hi)| lo..=hi)
            .collect();
        (Just(space), member)
    })
}
