//! Action and observation space descriptors for simbind.
//!
//! A space describes the set of legal values for an action fed to a model
//! or an observation read from it. Four kinds form a closed algebra:
//!
//! - [`Discrete`]: integers in `[0, n)`
//! - [`MultiDiscrete`]: vectors with `0 <= x[i] < nvec[i]`
//! - [`MultiBinary`]: vectors of `n` zeros and ones
//! - [`BoxSpace`]: shaped buffers with per-element inclusive bounds,
//!   generic over the ten element types and erased as [`AnyBox`]
//!
//! Each kind implements [`SpaceModel`]: membership testing, structural
//! equality, a compact `Display` rendering and a state round trip through
//! [`StateValue`] tuples. [`Space`] is the closed sum of all kinds.
//!
//! # Configuration
//!
//! [`SpacesConfig`] loads an environment's action and observation spaces
//! from JSON and builds them into [`Space`] values.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boxed;
pub mod config;
pub mod discrete;
pub mod error;
pub mod model;
pub mod multi_binary;
pub mod multi_discrete;
pub mod space;
pub mod state;

#[cfg(test)]
pub(crate) mod compliance;

pub use boxed::{AnyBox, Bound, BoxSpace};
pub use config::{BoundConfig, ConfigError, Infinity, Number, SpaceConfig, SpacesConfig};
pub use discrete::Discrete;
pub use error::SpaceError;
pub use model::SpaceModel;
pub use multi_binary::MultiBinary;
pub use multi_discrete::MultiDiscrete;
pub use space::{Sample, Space, SpaceKind};
pub use state::StateValue;
