//! Test fixtures and proptest strategies for simbind development.
//!
//! - [`fixtures`]: model-shaped aggregates with their bound
//!   [`AggregateLayout`](simbind_core::AggregateLayout)s.
//! - [`strategies`]: generators for every space kind and for members
//!   of a given space.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod strategies;

pub use fixtures::{controller_layout, Controller, Setpoint};
