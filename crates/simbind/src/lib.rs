//! simbind: expose the state of a simulation model, and the spaces of
//! values it accepts and produces, to reinforcement-learning agents.
//!
//! This is the facade crate that re-exports the public API of the simbind
//! sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use simbind::prelude::*;
//! use simbind::model::{array_field, scalar_field};
//!
//! #[derive(Default)]
//! struct Plant {
//!     time: f64,
//!     state: [[f64; 2]; 3],
//! }
//!
//! // Bind once.
//! let time = scalar_field!(Plant, time).read_only();
//! let state = array_field!(Plant, state).unwrap();
//!
//! // Access per step.
//! let mut plant = Plant::default();
//! state.write(&mut plant, &[1i32, 2, 3, 4, 5, 6]).unwrap();
//! assert_eq!(state.view(&plant).get(&[2, 1]), Some(&6.0));
//! assert!(matches!(
//!     time.set(&mut plant, 1.0),
//!     Err(FieldError::ReadOnlyViolation { .. })
//! ));
//!
//! // Describe the observation.
//! let observation = BoxSpace::uniform(0.0, 10.0, &[3, 2]).unwrap();
//! assert!(observation.contains(state.view(&plant).as_slice(), &[3, 2]));
//! assert_eq!(observation.to_string(), "Box(0, 10, [3, 2])");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`model`] | `simbind-core` | Element types, coercing copies, field descriptors, views, layouts |
//! | [`space`] | `simbind-space` | Space descriptors, state tuples, space configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element types, field descriptors and views (`simbind-core`).
///
/// [`model::ScalarField`], [`model::ArrayField`] and [`model::OpaqueField`]
/// describe one member of a model aggregate; [`model::AggregateLayout`]
/// collects them for access by name.
pub use simbind_core as model;

/// Action and observation spaces (`simbind-space`).
///
/// [`space::Discrete`], [`space::MultiDiscrete`], [`space::MultiBinary`]
/// and [`space::BoxSpace`], their closed sum [`space::Space`], and the
/// JSON configuration layer [`space::SpacesConfig`].
pub use simbind_space as space;

/// Common imports for typical simbind usage.
///
/// ```rust
/// use simbind::prelude::*;
/// ```
pub mod prelude {
    // Elements and values
    pub use simbind_core::{DType, Element, ElementBuffer, ElementSlice, ScalarValue};

    // Fields
    pub use simbind_core::{
        AggregateLayout, ArrayField, ArrayView, ArrayViewMut, FieldError, OpaqueField,
        ScalarField,
    };

    // Spaces
    pub use simbind_space::{
        AnyBox, BoxSpace, Discrete, MultiBinary, MultiDiscrete, Sample, Space, SpaceError,
        SpaceKind, SpaceModel,
    };

    // Configuration
    pub use simbind_space::{ConfigError, SpaceConfig, SpacesConfig};
}
