//! Conversions between Python objects and dtype-tagged core values.

use numpy::ndarray::{ArrayViewD, ArrayViewMutD, IxDyn};
use numpy::{
    PyArray1, PyArrayDescr, PyArrayDescrMethods, PyArrayDyn, PyArrayMethods, PyUntypedArray,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyTuple};
use pyo3::IntoPyObjectExt;
use simbind_core::{DType, ElementBuffer, ElementSlice, ScalarValue};
use simbind_space::{SpaceError, StateValue};

use crate::error::space_err;

/// A number as the narrowest tag that holds it without loss.
///
/// Floats (including NumPy float scalars) become `F64`, integers `I64`
/// or, beyond its range, `U64`. Booleans are integers.
pub(crate) fn scalar_from_py(value: &Bound<'_, PyAny>) -> PyResult<ScalarValue> {
    if value.is_instance_of::<PyFloat>() {
        return Ok(ScalarValue::F64(value.extract()?));
    }
    if let Ok(v) = value.extract::<i64>() {
        return Ok(ScalarValue::I64(v));
    }
    if let Ok(v) = value.extract::<u64>() {
        return Ok(ScalarValue::U64(v));
    }
    match value.extract::<f64>() {
        Ok(v) => Ok(ScalarValue::F64(v)),
        Err(_) => Err(PyTypeError::new_err(format!(
            "expected a number, got {}",
            value.get_type().name()?
        ))),
    }
}

pub(crate) fn scalar_to_py(py: Python<'_>, value: ScalarValue) -> PyResult<Bound<'_, PyAny>> {
    match value {
        ScalarValue::U8(v) => v.into_bound_py_any(py),
        ScalarValue::I8(v) => v.into_bound_py_any(py),
        ScalarValue::U16(v) => v.into_bound_py_any(py),
        ScalarValue::I16(v) => v.into_bound_py_any(py),
        ScalarValue::U32(v) => v.into_bound_py_any(py),
        ScalarValue::I32(v) => v.into_bound_py_any(py),
        ScalarValue::U64(v) => v.into_bound_py_any(py),
        ScalarValue::I64(v) => v.into_bound_py_any(py),
        ScalarValue::F32(v) => v.into_bound_py_any(py),
        ScalarValue::F64(v) => v.into_bound_py_any(py),
    }
}

/// The element type that holds every value of a NumPy dtype.
///
/// Booleans map to `uint8`, `float16` to `float32` and wider floats to
/// `float64`. Byte order is ignored. `None` for non-numeric dtypes.
fn element_dtype(dtype: &Bound<'_, PyArrayDescr>) -> Option<DType> {
    Some(match (dtype.kind(), dtype.itemsize()) {
        (b'b', _) | (b'u', 1) => DType::U8,
        (b'i', 1) => DType::I8,
        (b'u', 2) => DType::U16,
        (b'i', 2) => DType::I16,
        (b'u', 4) => DType::U32,
        (b'i', 4) => DType::I32,
        (b'u', 8) => DType::U64,
        (b'i', 8) => DType::I64,
        (b'f', 2 | 4) => DType::F32,
        (b'f', _) => DType::F64,
        _ => return None,
    })
}

/// Copy any array-like into a tagged buffer.
///
/// The ten native element types are kept as they are. Other numeric
/// dtypes (`bool`, `float16`, byte-swapped types) are cast to the element
/// type that holds them. Returns the buffer and the array's shape.
pub(crate) fn buffer_from_py(value: &Bound<'_, PyAny>) -> PyResult<(ElementBuffer, Vec<usize>)> {
    let py = value.py();
    let array = match value.cast::<PyUntypedArray>() {
        Ok(array) => array.clone(),
        Err(_) => py
            .import("numpy")?
            .call_method1("asarray", (value,))?
            .cast_into::<PyUntypedArray>()?,
    };
    let dtype = array.dtype();
    let Some(element) = element_dtype(&dtype) else {
        return Err(PyTypeError::new_err(format!(
            "unsupported array dtype {dtype}"
        )));
    };
    let native = dtype_to_py(py, element);
    let array = if dtype.is_equiv_to(&native) {
        array
    } else {
        array
            .call_method1("astype", (native,))?
            .cast_into::<PyUntypedArray>()?
    };
    let shape = array.shape().to_vec();

    macro_rules! collect_typed {
        ($($t:ty),*) => {
            $(
                if let Ok(typed) = array.as_any().cast::<PyArrayDyn<$t>>() {
                    let readonly = typed.try_readonly()?;
                    let values: Vec<$t> = readonly.as_array().iter().copied().collect();
                    return Ok((ElementBuffer::from(values), shape));
                }
            )*
        };
    }
    collect_typed!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

    Err(PyTypeError::new_err(format!(
        "unsupported array dtype {}",
        array.dtype()
    )))
}

/// Copy a tagged buffer into a new one-dimensional NumPy array.
pub(crate) fn buffer_to_py<'py>(py: Python<'py>, values: ElementSlice<'_>) -> Bound<'py, PyAny> {
    match values {
        ElementSlice::U8(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::I8(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::U16(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::I16(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::U32(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::I32(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::U64(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::I64(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::F32(v) => PyArray1::from_slice(py, v).into_any(),
        ElementSlice::F64(v) => PyArray1::from_slice(py, v).into_any(),
    }
}

/// A read-only NumPy array over `data`, keeping `owner` alive.
///
/// # Safety
///
/// `data` must live inside `owner` and must not move or be freed while
/// `owner` is alive.
pub(crate) unsafe fn alias_readonly<'py, T: numpy::Element>(
    owner: Bound<'py, PyAny>,
    data: &[T],
    shape: &[usize],
) -> PyResult<Bound<'py, PyArrayDyn<T>>> {
    let view = ArrayViewD::from_shape(IxDyn(shape), data)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    // SAFETY: the caller guarantees `data` is owned by `owner`, which the
    // new array holds as its base.
    let array = unsafe { PyArrayDyn::borrow_from_array(&view, owner) };
    array.getattr("flags")?.setattr("writeable", false)?;
    Ok(array)
}

/// A writable NumPy array over `data`, keeping `owner` alive.
///
/// # Safety
///
/// As for [`alias_readonly`]. Writes through the array bypass Rust's
/// borrow tracking; the caller must not hold other references to `data`
/// while Python code runs.
pub(crate) unsafe fn alias_writable<'py, T: numpy::Element>(
    owner: Bound<'py, PyAny>,
    data: &mut [T],
    shape: &[usize],
) -> PyResult<Bound<'py, PyArrayDyn<T>>> {
    let view = ArrayViewMutD::from_shape(IxDyn(shape), data)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    // SAFETY: see the function contract.
    Ok(unsafe { PyArrayDyn::borrow_from_array(&view, owner) })
}

/// The NumPy dtype object for a core dtype.
pub(crate) fn dtype_to_py(py: Python<'_>, dtype: DType) -> Bound<'_, PyArrayDescr> {
    match dtype {
        DType::U8 => numpy::dtype::<u8>(py),
        DType::I8 => numpy::dtype::<i8>(py),
        DType::U16 => numpy::dtype::<u16>(py),
        DType::I16 => numpy::dtype::<i16>(py),
        DType::U32 => numpy::dtype::<u32>(py),
        DType::I32 => numpy::dtype::<i32>(py),
        DType::U64 => numpy::dtype::<u64>(py),
        DType::I64 => numpy::dtype::<i64>(py),
        DType::F32 => numpy::dtype::<f32>(py),
        DType::F64 => numpy::dtype::<f64>(py),
    }
}

// ── State tuples ────────────────────────────────────────────────────

/// Python form of a state tuple: counts become ints, count lists become
/// tuples of ints, element buffers become one-dimensional arrays.
pub(crate) fn state_to_py<'py>(
    py: Python<'py>,
    state: &[StateValue],
) -> PyResult<Bound<'py, PyTuple>> {
    let items = state
        .iter()
        .map(|item| match item {
            StateValue::Count(n) => n.into_bound_py_any(py),
            StateValue::Counts(v) => PyTuple::new(py, v).map(Bound::into_any),
            StateValue::Elements(buffer) => Ok(buffer_to_py(py, buffer.as_slice())),
        })
        .collect::<PyResult<Vec<_>>>()?;
    PyTuple::new(py, items)
}

/// Inverse of [`state_to_py`].
///
/// Arrays become element buffers. Any other object with `__index__`
/// (Python and NumPy integers, not booleans) is a count, and any other
/// iterable a list of counts. Negative counts are an invalid state.
pub(crate) fn state_from_py(
    space: &'static str,
    state: &Bound<'_, PyTuple>,
) -> PyResult<Vec<StateValue>> {
    let invalid = |reason: String| space_err(SpaceError::InvalidState { space, reason });
    let count = |item: &Bound<'_, PyAny>| -> PyResult<u64> {
        let n = item
            .extract::<i128>()
            .map_err(|_| invalid(format!("expected a count, got {item}")))?;
        u64::try_from(n).map_err(|_| invalid(format!("count {n} is out of range")))
    };

    state
        .iter()
        .map(|item| {
            if item.is_instance_of::<PyUntypedArray>() {
                let (buffer, _) = buffer_from_py(&item)?;
                Ok(StateValue::Elements(buffer))
            } else if !item.is_instance_of::<PyBool>() && item.hasattr("__index__")? {
                Ok(StateValue::Count(count(&item)?))
            } else if let Ok(items) = item.try_iter() {
                items
                    .map(|v| count(&v?))
                    .collect::<PyResult<Vec<_>>>()
                    .map(StateValue::Counts)
            } else {
                Err(invalid(format!(
                    "unsupported item of type {}",
                    item.get_type().name()?
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{np_array, with_module, with_python};

    #[test]
    fn native_dtypes_are_kept() {
        with_module("numpy", |py| {
            let (buffer, shape) = buffer_from_py(&np_array(py, vec![[1, 2], [3, 4]], "int16")?)?;
            assert_eq!(buffer, ElementBuffer::I16(vec![1, 2, 3, 4]));
            assert_eq!(shape, [2, 2]);
            Ok(())
        });
    }

    #[test]
    fn exotic_dtypes_are_cast_to_an_element_type() {
        with_module("numpy", |py| {
            let (half, _) = buffer_from_py(&np_array(py, vec![0.5, -2.0], "float16")?)?;
            assert_eq!(half, ElementBuffer::F32(vec![0.5, -2.0]));

            let (swapped, _) = buffer_from_py(&np_array(py, vec![1, -300], ">i4")?)?;
            assert_eq!(swapped, ElementBuffer::I32(vec![1, -300]));

            let (flags, _) = buffer_from_py(&np_array(py, vec![true, false], "bool")?)?;
            assert_eq!(flags, ElementBuffer::U8(vec![1, 0]));

            let (listed, shape) = buffer_from_py(PyTuple::new(py, [1.5f64, 2.5])?.as_any())?;
            assert_eq!(listed, ElementBuffer::F64(vec![1.5, 2.5]));
            assert_eq!(shape, [2]);
            Ok(())
        });
    }

    #[test]
    fn non_numeric_arrays_are_rejected() {
        with_module("numpy", |py| {
            let err = buffer_from_py(&np_array(py, vec!["a", "b"], "U1")?).unwrap_err();
            assert!(err.is_instance_of::<PyTypeError>(py));
            Ok(())
        });
    }

    #[test]
    fn numpy_integers_are_counts() {
        with_module("numpy", |py| {
            let count = py.import("numpy")?.getattr("int64")?.call1((3,))?;
            let state = PyTuple::new(py, [count])?;
            assert_eq!(state_from_py("Discrete", &state)?, [StateValue::Count(3)]);
            Ok(())
        });
    }

    #[test]
    fn state_items_map_by_kind() {
        with_python(|py| {
            let state = PyTuple::new(
                py,
                [
                    5u64.into_bound_py_any(py)?,
                    PyTuple::new(py, [2u64, 3])?.into_any(),
                ],
            )?;
            assert_eq!(
                state_from_py("MultiDiscrete", &state)?,
                [StateValue::Count(5), StateValue::Counts(vec![2, 3])]
            );

            let back = state_to_py(py, &[StateValue::Count(5)])?;
            assert_eq!(back.get_item(0)?.extract::<u64>()?, 5);
            Ok(())
        });
    }

    #[test]
    fn bad_state_items_are_value_errors() {
        with_python(|py| {
            for item in [
                (-1i64).into_bound_py_any(py)?,
                true.into_bound_py_any(py)?,
                "x".into_bound_py_any(py)?,
            ] {
                let state = PyTuple::new(py, [item])?;
                let err = state_from_py("Discrete", &state).unwrap_err();
                assert!(err.is_instance_of::<PyValueError>(py), "{err}");
            }
            Ok(())
        });
    }
}
