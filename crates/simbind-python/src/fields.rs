//! Field accessors for generated model bindings.
//!
//! A generated binding wraps one model aggregate in a `#[pyclass]` and
//! implements [`ModelObject`] for it. Each Python property is then a
//! one-line call into this module:
//!
//! - scalars are copied in and out ([`scalar_get`], [`scalar_set`]),
//! - arrays are exposed as NumPy arrays that alias the aggregate's
//!   storage and keep the Python object alive ([`array_get`]), and are
//!   overwritten with a coercing copy ([`array_set`]),
//! - aggregate-typed members are a read-only `uint8` window
//!   ([`opaque_get`]).
//!
//! [`layout_get`], [`layout_set`] and [`layout_fields`] offer the same by
//! field name through an [`AggregateLayout`].
//!
//! Views alias memory owned by the Python object. Nothing here
//! synchronizes access: mutating the aggregate while Python code holds a
//! view is visible through the view, and concurrent mutation from another
//! thread is the caller's responsibility.

use numpy::PyArrayDyn;
use pyo3::prelude::*;
use pyo3::pyclass::boolean_struct::False;
use pyo3::types::{PyDict, PyList, PyTuple};
use pyo3::{IntoPyObjectExt, PyClass};
use simbind_core::{
    AggregateLayout, ArrayField, Element, ElementSlice, ElementSliceMut, FieldError, FieldKind,
    FixedShape, OpaqueField, ScalarField,
};

use crate::convert::{
    alias_readonly, alias_writable, buffer_from_py, dtype_to_py, scalar_from_py, scalar_to_py,
};
use crate::error::field_err;

/// A Python class that owns one model aggregate inline.
///
/// The aggregate must be stored by value in the class so that its address
/// is stable for the lifetime of the Python object.
pub trait ModelObject: PyClass<Frozen = False> {
    /// The wrapped aggregate type.
    type Aggregate: 'static;

    /// Borrow the aggregate.
    fn aggregate(&self) -> &Self::Aggregate;

    /// Mutably borrow the aggregate.
    fn aggregate_mut(&mut self) -> &mut Self::Aggregate;
}

/// Current value of a scalar field as a Python number.
pub fn scalar_get<'py, C, T>(
    obj: &Bound<'py, C>,
    field: &ScalarField<C::Aggregate, T>,
) -> PyResult<Bound<'py, PyAny>>
where
    C: ModelObject,
    T: Element + for<'a> IntoPyObject<'a>,
{
    let value = field.get(obj.try_borrow()?.aggregate());
    value.into_bound_py_any(obj.py())
}

/// Assign a Python number to a scalar field, converting with `as`
/// semantics. Read-only fields raise `AttributeError`.
pub fn scalar_set<C, T>(
    obj: &Bound<'_, C>,
    field: &ScalarField<C::Aggregate, T>,
    value: &Bound<'_, PyAny>,
) -> PyResult<()>
where
    C: ModelObject,
    T: Element,
{
    let value = scalar_from_py(value)?;
    let mut this = obj.try_borrow_mut()?;
    field.set_dyn(this.aggregate_mut(), value).map_err(field_err)
}

/// A NumPy array aliasing an array field, shaped like the field.
///
/// The array's base is `obj`. It is read-only when the field is.
pub fn array_get<'py, C, F>(
    obj: &Bound<'py, C>,
    field: &ArrayField<C::Aggregate, F>,
) -> PyResult<Bound<'py, PyArrayDyn<F::Elem>>>
where
    C: ModelObject,
    F: FixedShape,
    F::Elem: numpy::Element,
{
    let owner = obj.clone().into_any();
    if field.meta().read_only {
        let this = obj.try_borrow()?;
        let data = field.elements(this.aggregate());
        // SAFETY: the aggregate is stored inline in `obj`, which the array
        // keeps alive as its base.
        return unsafe { alias_readonly(owner, data, field.shape()) };
    }
    let mut this = obj.try_borrow_mut()?;
    let mut view = field.view_mut(this.aggregate_mut()).map_err(field_err)?;
    // SAFETY: as above.
    unsafe { alias_writable(owner, view.as_mut_slice(), field.shape()) }
}

/// Overwrite an array field from any array-like of matching element count.
///
/// The source is converted elementwise to the field's type. Nothing is
/// written if the count differs or the field is read-only.
pub fn array_set<C, F>(
    obj: &Bound<'_, C>,
    field: &ArrayField<C::Aggregate, F>,
    value: &Bound<'_, PyAny>,
) -> PyResult<()>
where
    C: ModelObject,
    F: FixedShape,
{
    let (buffer, _) = buffer_from_py(value)?;
    let mut this = obj.try_borrow_mut()?;
    field
        .write_dyn(this.aggregate_mut(), buffer.as_slice())
        .map_err(field_err)
}

/// A read-only `uint8` array over the raw bytes of an aggregate-typed
/// member.
pub fn opaque_get<'py, C, F>(
    obj: &Bound<'py, C>,
    field: &OpaqueField<C::Aggregate, F>,
) -> PyResult<Bound<'py, PyArrayDyn<u8>>>
where
    C: ModelObject,
    F: bytemuck::NoUninit,
{
    let this = obj.try_borrow()?;
    let bytes = field.bytes(this.aggregate());
    // SAFETY: the aggregate is stored inline in `obj`.
    unsafe { alias_readonly(obj.clone().into_any(), bytes, &[bytes.len()]) }
}

// ── By name ─────────────────────────────────────────────────────────

fn alias_elements<'py>(
    owner: Bound<'py, PyAny>,
    data: ElementSlice<'_>,
    shape: &[usize],
) -> PyResult<Bound<'py, PyAny>> {
    // SAFETY (all arms): `data` points into the aggregate owned by `owner`.
    unsafe {
        Ok(match data {
            ElementSlice::U8(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::I8(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::U16(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::I16(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::U32(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::I32(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::U64(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::I64(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::F32(v) => alias_readonly(owner, v, shape)?.into_any(),
            ElementSlice::F64(v) => alias_readonly(owner, v, shape)?.into_any(),
        })
    }
}

fn alias_elements_mut<'py>(
    owner: Bound<'py, PyAny>,
    data: ElementSliceMut<'_>,
    shape: &[usize],
) -> PyResult<Bound<'py, PyAny>> {
    // SAFETY (all arms): `data` points into the aggregate owned by `owner`.
    unsafe {
        Ok(match data {
            ElementSliceMut::U8(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::I8(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::U16(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::I16(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::U32(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::I32(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::U64(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::I64(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::F32(v) => alias_writable(owner, v, shape)?.into_any(),
            ElementSliceMut::F64(v) => alias_writable(owner, v, shape)?.into_any(),
        })
    }
}

/// Read a field by name.
///
/// Scalars come back as Python numbers. Arrays come back as aliasing
/// arrays, writable unless the field is read-only. Opaque members are a
/// read-only `uint8` window. Unknown names raise `KeyError`.
pub fn layout_get<'py, C: ModelObject>(
    obj: &Bound<'py, C>,
    layout: &AggregateLayout<C::Aggregate>,
    name: &str,
) -> PyResult<Bound<'py, PyAny>> {
    let py = obj.py();
    let owner = obj.clone().into_any();
    let info = layout.info(name).map_err(field_err)?;
    let read_only = info.read_only;
    match info.kind {
        FieldKind::Scalar => {
            let this = obj.try_borrow()?;
            let value = layout
                .get_scalar(this.aggregate(), name)
                .map_err(field_err)?;
            scalar_to_py(py, value)
        }
        FieldKind::Array { shape } if read_only => {
            let this = obj.try_borrow()?;
            let data = layout.array(this.aggregate(), name).map_err(field_err)?;
            alias_elements(owner, data, &shape)
        }
        FieldKind::Array { shape } => {
            let mut this = obj.try_borrow_mut()?;
            let data = layout
                .array_mut(this.aggregate_mut(), name)
                .map_err(field_err)?;
            alias_elements_mut(owner, data, &shape)
        }
        FieldKind::Opaque { size } => {
            let this = obj.try_borrow()?;
            let bytes = layout.raw_bytes(this.aggregate(), name).map_err(field_err)?;
            alias_elements(owner, ElementSlice::U8(bytes), &[size])
        }
    }
}

/// Write a field by name: a number for scalars, an array-like for arrays.
///
/// Opaque members are read-only and raise `AttributeError`.
pub fn layout_set<C: ModelObject>(
    obj: &Bound<'_, C>,
    layout: &AggregateLayout<C::Aggregate>,
    name: &str,
    value: &Bound<'_, PyAny>,
) -> PyResult<()> {
    let kind = layout.info(name).map_err(field_err)?.kind;
    let mut this = obj.try_borrow_mut()?;
    let aggregate = this.aggregate_mut();
    match kind {
        FieldKind::Scalar => {
            let value = scalar_from_py(value)?;
            layout.set_scalar(aggregate, name, value).map_err(field_err)
        }
        FieldKind::Array { .. } => {
            let (buffer, _) = buffer_from_py(value)?;
            layout
                .write_array(aggregate, name, buffer.as_slice())
                .map_err(field_err)
        }
        FieldKind::Opaque { .. } => Err(field_err(FieldError::ReadOnlyViolation {
            field: name.to_string(),
        })),
    }
}

/// Field metadata as a list of dicts with keys `name`, `kind`, `dtype`,
/// `shape`, `read_only` and `doc`, in declaration order.
pub fn layout_fields<'py, A: 'static>(
    py: Python<'py>,
    layout: &AggregateLayout<A>,
) -> PyResult<Bound<'py, PyList>> {
    let out = PyList::empty(py);
    for info in layout.fields() {
        let entry = PyDict::new(py);
        entry.set_item("name", info.name)?;
        entry.set_item("kind", info.kind.name())?;
        match info.dtype {
            Some(dtype) => entry.set_item("dtype", dtype_to_py(py, dtype))?,
            None => entry.set_item("dtype", py.None())?,
        }
        match &info.kind {
            FieldKind::Scalar => entry.set_item("shape", ())?,
            FieldKind::Array { shape } => {
                entry.set_item("shape", PyTuple::new(py, shape.iter())?)?
            }
            FieldKind::Opaque { size } => entry.set_item("shape", (*size,))?,
        }
        entry.set_item("read_only", info.read_only)?;
        entry.set_item("doc", info.doc)?;
        out.append(entry)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{np_array, with_module, with_python};
    use numpy::{PyArrayMethods, PyUntypedArrayMethods};
    use pyo3::exceptions::{PyAttributeError, PyKeyError, PyValueError};
    use simbind_core::{array_field, opaque_field, scalar_field};
    use simbind_test_utils::{controller_layout, Controller};

    #[pyclass]
    struct ControllerObject {
        inner: Controller,
    }

    impl ModelObject for ControllerObject {
        type Aggregate = Controller;

        fn aggregate(&self) -> &Controller {
            &self.inner
        }

        fn aggregate_mut(&mut self) -> &mut Controller {
            &mut self.inner
        }
    }

    fn controller(py: Python<'_>) -> PyResult<Bound<'_, ControllerObject>> {
        Bound::new(
            py,
            ControllerObject {
                inner: Controller::sample(),
            },
        )
    }

    fn layout() -> PyResult<AggregateLayout<Controller>> {
        controller_layout().map_err(field_err)
    }

    fn writeable(array: &Bound<'_, PyAny>) -> PyResult<bool> {
        array.getattr("flags")?.getattr("writeable")?.extract()
    }

    #[test]
    fn scalars_copy_in_and_out() {
        with_python(|py| {
            let obj = controller(py)?;
            let gain = scalar_field!(Controller, gain);
            assert_eq!(scalar_get(&obj, &gain)?.extract::<f64>()?, 0.5);

            let mode = scalar_field!(Controller, mode);
            scalar_set(&obj, &mode, &7.9f64.into_bound_py_any(py)?)?;
            assert_eq!(obj.borrow().inner.mode, 7);

            let tick = scalar_field!(Controller, tick).read_only();
            let err = scalar_set(&obj, &tick, &1.into_bound_py_any(py)?).unwrap_err();
            assert!(err.is_instance_of::<PyAttributeError>(py));
            assert_eq!(obj.borrow().inner.tick, 17);
            Ok(())
        });
    }

    #[test]
    fn array_view_aliases_the_aggregate_both_ways() {
        with_module("numpy", |py| {
            let obj = controller(py)?;
            let weights = array_field!(Controller, weights).map_err(field_err)?;
            let view = array_get(&obj, &weights)?;
            assert!(view.getattr("base")?.is(&obj));
            assert!(writeable(view.as_any())?);
            assert_eq!(view.shape(), [2, 3]);

            obj.borrow_mut().inner.weights[1][2] = -4.0;
            assert_eq!(view.get_item((1, 2))?.extract::<f64>()?, -4.0);

            view.set_item((0, 1), 9.0)?;
            assert_eq!(obj.borrow().inner.weights[0][1], 9.0);
            Ok(())
        });
    }

    #[test]
    fn array_view_keeps_its_owner_alive() {
        with_module("numpy", |py| {
            let view = {
                let obj = controller(py)?;
                let inputs = array_field!(Controller, inputs).map_err(field_err)?;
                array_get(&obj, &inputs)?
            };
            let owner = view.getattr("base")?.cast_into::<ControllerObject>()?;
            assert_eq!(owner.borrow().inner.inputs, [1.0, 2.0, 3.0, 4.0]);
            assert_eq!(view.get_item(3)?.extract::<f32>()?, 4.0);
            Ok(())
        });
    }

    #[test]
    fn read_only_arrays_are_not_writeable() {
        with_module("numpy", |py| {
            let obj = controller(py)?;
            let flags = array_field!(Controller, flags)
                .map_err(field_err)?
                .read_only();
            let view = array_get(&obj, &flags)?;
            assert!(!writeable(view.as_any())?);
            assert!(view.set_item(0, 0).is_err());

            let zeros = np_array(py, vec![0, 0, 0], "uint8")?;
            let err = array_set(&obj, &flags, &zeros).unwrap_err();
            assert!(err.is_instance_of::<PyAttributeError>(py));
            assert_eq!(obj.borrow().inner.flags, [1, 0, 1]);
            Ok(())
        });
    }

    #[test]
    fn array_set_coerces_and_checks_length() {
        with_module("numpy", |py| {
            let obj = controller(py)?;
            let inputs = array_field!(Controller, inputs).map_err(field_err)?;
            let values = np_array(py, vec![1.9, -2.9, 3.5, 0.0], "float64")?;
            array_set(&obj, &inputs, &values)?;
            assert_eq!(obj.borrow().inner.inputs, [1.9, -2.9, 3.5, 0.0]);

            let flags = array_field!(Controller, flags).map_err(field_err)?;
            array_set(&obj, &flags, &vec![2.7, 0.2, 255.9].into_bound_py_any(py)?)?;
            assert_eq!(obj.borrow().inner.flags, [2, 0, 255]);

            let err = array_set(&obj, &flags, &vec![1, 2].into_bound_py_any(py)?).unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
            assert_eq!(obj.borrow().inner.flags, [2, 0, 255]);
            Ok(())
        });
    }

    #[test]
    fn opaque_member_is_a_read_only_byte_window() {
        with_module("numpy", |py| {
            let obj = controller(py)?;
            let setpoint = opaque_field!(Controller, setpoint);
            let bytes = opaque_get(&obj, &setpoint)?;
            assert!(!writeable(bytes.as_any())?);
            let expected = bytemuck::bytes_of(&obj.borrow().inner.setpoint).to_vec();
            assert_eq!(bytes.readonly().as_slice()?, &expected[..]);
            Ok(())
        });
    }

    #[test]
    fn layout_views_follow_field_writability() {
        with_module("numpy", |py| {
            let obj = controller(py)?;
            let layout = layout()?;

            let inputs = layout_get(&obj, &layout, "inputs")?;
            assert!(writeable(&inputs)?);
            inputs.set_item(0, 8.0)?;
            assert_eq!(obj.borrow().inner.inputs[0], 8.0);

            let flags = layout_get(&obj, &layout, "flags")?;
            assert!(!writeable(&flags)?);

            let setpoint = layout_get(&obj, &layout, "setpoint")?;
            assert!(!writeable(&setpoint)?);
            assert_eq!(setpoint.len()?, 16);
            Ok(())
        });
    }

    #[test]
    fn layout_scalars_and_errors() {
        with_python(|py| {
            let obj = controller(py)?;
            let layout = layout()?;
            assert_eq!(layout_get(&obj, &layout, "tick")?.extract::<u32>()?, 17);

            layout_set(&obj, &layout, "gain", &2.into_bound_py_any(py)?)?;
            assert_eq!(obj.borrow().inner.gain, 2.0);

            let value = 0.into_bound_py_any(py)?;
            let err = layout_set(&obj, &layout, "tick", &value).unwrap_err();
            assert!(err.is_instance_of::<PyAttributeError>(py));
            let err = layout_set(&obj, &layout, "setpoint", &value).unwrap_err();
            assert!(err.is_instance_of::<PyAttributeError>(py));
            let err = layout_get(&obj, &layout, "missing").unwrap_err();
            assert!(err.is_instance_of::<PyKeyError>(py));
            Ok(())
        });
    }

    #[test]
    fn layout_fields_describe_every_member() {
        with_module("numpy", |py| {
            let fields = layout_fields(py, &layout()?)?;
            assert_eq!(fields.len(), 7);

            let weights = fields.get_item(4)?;
            assert_eq!(weights.get_item("name")?.extract::<String>()?, "weights");
            assert_eq!(weights.get_item("kind")?.extract::<String>()?, "array");
            assert_eq!(weights.get_item("shape")?.extract::<(usize, usize)>()?, (2, 3));
            assert_eq!(weights.get_item("doc")?.extract::<String>()?, "mixing matrix");
            assert!(!weights.get_item("read_only")?.extract::<bool>()?);

            let setpoint = fields.get_item(6)?;
            assert!(setpoint.get_item("dtype")?.is_none());
            assert_eq!(setpoint.get_item("shape")?.extract::<(usize,)>()?, (16,));
            Ok(())
        });
    }
}
