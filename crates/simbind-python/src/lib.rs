//! Python bindings for simbind.
//!
//! The native extension is named `_simbind`. It exposes the space classes
//! (`Discrete`, `MultiDiscrete`, `MultiBinary` and `BoxUint8` through
//! `BoxFloat64`) and space configuration loading. Generated model
//! bindings link this crate and use [`fields`] to expose model members as
//! Python properties.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(unsafe_code)]

use pyo3::prelude::*;

mod config;
mod convert;
mod error;
pub mod fields;
mod spaces;
#[cfg(test)]
mod testing;

pub use fields::ModelObject;

/// The native `_simbind` extension module.
#[pymodule]
fn _simbind(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // Spaces
    spaces::register(m)?;

    // Functions
    m.add_function(wrap_pyfunction!(config::load_spaces, m)?)?;
    m.add_function(wrap_pyfunction!(config::spaces_from_json, m)?)?;

    Ok(())
}
