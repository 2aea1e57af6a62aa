//! Environment space configuration loading.

use pyo3::prelude::*;
use simbind_space::SpacesConfig;

use crate::error::config_err;
use crate::spaces::space_to_py;

fn build<'py>(
    py: Python<'py>,
    config: &SpacesConfig,
) -> PyResult<(Bound<'py, PyAny>, Bound<'py, PyAny>)> {
    let (action, observation) = config.build().map_err(config_err)?;
    Ok((space_to_py(py, action)?, space_to_py(py, observation)?))
}

/// Load `(action_space, observation_space)` from a JSON file.
///
/// Args:
///     path: Path to the environment's space configuration.
#[pyfunction]
pub(crate) fn load_spaces(
    py: Python<'_>,
    path: std::path::PathBuf,
) -> PyResult<(Bound<'_, PyAny>, Bound<'_, PyAny>)> {
    let config = SpacesConfig::load(&path).map_err(config_err)?;
    tracing::debug!(path = %path.display(), "loaded space configuration");
    build(py, &config)
}

/// Parse `(action_space, observation_space)` from a JSON string.
#[pyfunction]
pub(crate) fn spaces_from_json<'py>(
    py: Python<'py>,
    text: &str,
) -> PyResult<(Bound<'py, PyAny>, Bound<'py, PyAny>)> {
    let config = SpacesConfig::from_json_str(text).map_err(config_err)?;
    build(py, &config)
}
