//! Embedded-interpreter helpers for the unit tests.

use pyo3::prelude::*;

fn run(py: Python<'_>, f: impl FnOnce(Python<'_>) -> PyResult<()>) {
    if let Err(err) = f(py) {
        err.display(py);
        panic!("python error: {err}");
    }
}

/// Run `f` on the embedded interpreter, surfacing Python errors as panics.
pub(crate) fn with_python(f: impl FnOnce(Python<'_>) -> PyResult<()>) {
    Python::attach(|py| run(py, f));
}

/// Like [`with_python`], but skipped when `module` is not installed.
pub(crate) fn with_module(module: &str, f: impl FnOnce(Python<'_>) -> PyResult<()>) {
    Python::attach(|py| {
        if let Err(err) = py.import(module) {
            eprintln!("skipping: cannot import {module}: {err}");
            return;
        }
        run(py, f);
    });
}

/// `numpy.array(values, dtype=dtype)`.
pub(crate) fn np_array<'py>(
    py: Python<'py>,
    values: impl IntoPyObject<'py>,
    dtype: &str,
) -> PyResult<Bound<'py, PyAny>> {
    py.import("numpy")?.call_method1("array", (values, dtype))
}
