//! Python classes for the four space kinds.
//!
//! Each class wraps its core descriptor immutably (`frozen`), compares
//! structurally, renders with the core `Display`, pickles through
//! `__reduce__` and converts to the matching `gymnasium.spaces` object.

use numpy::{AllowTypeChange, PyArray1, PyArrayDescr, PyArrayDyn, PyArrayLikeDyn};
use numpy::{PyArrayMethods, PyUntypedArray, PyUntypedArrayMethods};
use pyo3::prelude::*;
use pyo3::types::{PyInt, PyTuple, PyType};
use simbind_core::Element;
use simbind_space::{AnyBox, Bound as BoxBound, BoxSpace, Discrete, MultiBinary, MultiDiscrete};
use simbind_space::{Space, SpaceModel};

use crate::convert::{alias_readonly, state_from_py, state_to_py};
use crate::error::space_err;

fn gymnasium_space<'py>(py: Python<'py>, class: &str) -> PyResult<Bound<'py, PyAny>> {
    py.import("gymnasium.spaces")?.getattr(class)
}

/// `(cls._from_state, (state,))`, the pickle protocol's reconstructor.
fn reduce<'py, S: SpaceModel>(
    slf: &Bound<'py, PyAny>,
    space: &S,
) -> PyResult<(Bound<'py, PyAny>, (Bound<'py, PyTuple>,))> {
    let py = slf.py();
    let from_state = slf.get_type().getattr("_from_state")?;
    Ok((from_state, (state_to_py(py, &space.to_state())?,)))
}

fn restore<S: SpaceModel>(state: &Bound<'_, PyTuple>) -> PyResult<S> {
    let state = state_from_py(S::NAME, state)?;
    S::from_state(&state).map_err(space_err)
}

/// Integer membership where out-of-range Python ints are simply not members.
fn index_from_py(x: &Bound<'_, PyAny>) -> PyResult<Option<i64>> {
    match x.extract::<i64>() {
        Ok(v) => Ok(Some(v)),
        Err(_) if x.is_instance_of::<PyInt>() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Vector membership input: any iterable of ints.
fn indices_from_py(x: &Bound<'_, PyAny>) -> PyResult<Option<Vec<i64>>> {
    let mut out = Vec::new();
    for item in x.try_iter()? {
        match index_from_py(&item?)? {
            Some(v) => out.push(v),
            None => return Ok(None),
        }
    }
    Ok(Some(out))
}

// ── Discrete ────────────────────────────────────────────────────────

/// Integers in `[0, n)`.
#[pyclass(frozen, eq, module = "simbind._simbind", name = "Discrete")]
#[derive(PartialEq)]
pub(crate) struct PyDiscrete {
    pub(crate) inner: Discrete,
}

#[pymethods]
impl PyDiscrete {
    #[new]
    fn new(n: u64) -> Self {
        Self {
            inner: Discrete::new(n),
        }
    }

    /// Number of values.
    #[getter]
    fn n(&self) -> u64 {
        self.inner.n()
    }

    /// Element type of samples (`uint64`).
    #[getter]
    fn dtype<'py>(&self, py: Python<'py>) -> Bound<'py, PyArrayDescr> {
        numpy::dtype::<u64>(py)
    }

    /// Whether `x` is an integer in `[0, n)`.
    fn contains(&self, x: &Bound<'_, PyAny>) -> PyResult<bool> {
        Ok(index_from_py(x)?.is_some_and(|v| self.inner.contains(v)))
    }

    fn __contains__(&self, x: &Bound<'_, PyAny>) -> PyResult<bool> {
        self.contains(x)
    }

    fn __repr__(&self) -> String {
        self.inner.to_string()
    }

    fn __reduce__<'py>(
        slf: &Bound<'py, Self>,
    ) -> PyResult<(Bound<'py, PyAny>, (Bound<'py, PyTuple>,))> {
        reduce(slf.as_any(), &slf.get().inner)
    }

    #[classmethod]
    fn _from_state(_cls: &Bound<'_, PyType>, state: &Bound<'_, PyTuple>) -> PyResult<Self> {
        Ok(Self {
            inner: restore(state)?,
        })
    }

    /// The equivalent `gymnasium.spaces.Discrete`.
    fn to_gymnasium<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        gymnasium_space(py, "Discrete")?.call1((self.inner.n(),))
    }
}

// ── MultiDiscrete ───────────────────────────────────────────────────

/// Vectors with `0 <= x[i] < nvec[i]`.
#[pyclass(frozen, eq, module = "simbind._simbind", name = "MultiDiscrete")]
#[derive(PartialEq)]
pub(crate) struct PyMultiDiscrete {
    pub(crate) inner: MultiDiscrete,
}

#[pymethods]
impl PyMultiDiscrete {
    #[new]
    fn new(nvec: Vec<u64>) -> Self {
        Self {
            inner: MultiDiscrete::new(nvec),
        }
    }

    /// Number of values per dimension.
    #[getter]
    fn nvec<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u64>> {
        PyArray1::from_slice(py, self.inner.nvec())
    }

    /// Element type of samples (`uint64`).
    #[getter]
    fn dtype<'py>(&self, py: Python<'py>) -> Bound<'py, PyArrayDescr> {
        numpy::dtype::<u64>(py)
    }

    /// Whether `x` has one in-range integer per dimension.
    fn contains(&self, x: &Bound<'_, PyAny>) -> PyResult<bool> {
        Ok(indices_from_py(x)?.is_some_and(|v| self.inner.contains(&v)))
    }

    fn __contains__(&self, x: &Bound<'_, PyAny>) -> PyResult<bool> {
        self.contains(x)
    }

    fn __repr__(&self) -> String {
        self.inner.to_string()
    }

    fn __reduce__<'py>(
        slf: &Bound<'py, Self>,
    ) -> PyResult<(Bound<'py, PyAny>, (Bound<'py, PyTuple>,))> {
        reduce(slf.as_any(), &slf.get().inner)
    }

    #[classmethod]
    fn _from_state(_cls: &Bound<'_, PyType>, state: &Bound<'_, PyTuple>) -> PyResult<Self> {
        Ok(Self {
            inner: restore(state)?,
        })
    }

    /// The equivalent `gymnasium.spaces.MultiDiscrete`.
    fn to_gymnasium<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        gymnasium_space(py, "MultiDiscrete")?.call1((self.nvec(py),))
    }
}

// ── MultiBinary ─────────────────────────────────────────────────────

/// Vectors of `n` zeros and ones.
#[pyclass(frozen, eq, module = "simbind._simbind", name = "MultiBinary")]
#[derive(PartialEq)]
pub(crate) struct PyMultiBinary {
    pub(crate) inner: MultiBinary,
}

#[pymethods]
impl PyMultiBinary {
    #[new]
    fn new(n: u64) -> Self {
        Self {
            inner: MultiBinary::new(n),
        }
    }

    /// Vector length.
    #[getter]
    fn n(&self) -> u64 {
        self.inner.n()
    }

    /// Element type of samples. NumPy `bool` on the Python side.
    #[getter]
    fn dtype<'py>(&self, py: Python<'py>) -> Bound<'py, PyArrayDescr> {
        numpy::dtype::<bool>(py)
    }

    /// Whether `x` holds exactly `n` zeros and ones.
    fn contains(&self, x: &Bound<'_, PyAny>) -> PyResult<bool> {
        Ok(indices_from_py(x)?.is_some_and(|v| self.inner.contains(&v)))
    }

    fn __contains__(&self, x: &Bound<'_, PyAny>) -> PyResult<bool> {
        self.contains(x)
    }

    fn __repr__(&self) -> String {
        self.inner.to_string()
    }

    fn __reduce__<'py>(
        slf: &Bound<'py, Self>,
    ) -> PyResult<(Bound<'py, PyAny>, (Bound<'py, PyTuple>,))> {
        reduce(slf.as_any(), &slf.get().inner)
    }

    #[classmethod]
    fn _from_state(_cls: &Bound<'_, PyType>, state: &Bound<'_, PyTuple>) -> PyResult<Self> {
        Ok(Self {
            inner: restore(state)?,
        })
    }

    /// The equivalent `gymnasium.spaces.MultiBinary`.
    fn to_gymnasium<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        gymnasium_space(py, "MultiBinary")?.call1((self.inner.n(),))
    }
}

// ── Box ─────────────────────────────────────────────────────────────

/// Numbers and zero-dimensional arrays broadcast as Box bounds.
fn is_scalar(value: &Bound<'_, PyAny>) -> PyResult<bool> {
    match value.cast::<PyUntypedArray>() {
        Ok(array) => Ok(array.ndim() == 0),
        Err(_) => Ok(!value.hasattr("__len__")?),
    }
}

/// A Box bound from Python.
///
/// A scalar is extracted as `T` exactly, so integer bounds keep their full
/// range and a float raises `TypeError` for an integer Box. Anything else
/// is flattened and cast to `T`.
fn bound_from_py<'py, T>(value: &Bound<'py, PyAny>) -> PyResult<BoxBound<T>>
where
    T: Element + numpy::Element + FromPyObjectOwned<'py>,
{
    if is_scalar(value)? {
        let v: T = value.extract().map_err(Into::<PyErr>::into)?;
        return Ok(BoxBound::Uniform(v));
    }
    let array: PyArrayLikeDyn<'py, T, AllowTypeChange> = value.extract()?;
    Ok(BoxBound::Each(array.as_array().iter().copied().collect()))
}

fn box_contains<T: Element + numpy::Element>(
    space: &BoxSpace<T>,
    x: &PyArrayLikeDyn<'_, T, AllowTypeChange>,
) -> bool {
    let shape = x.shape();
    match x.as_slice() {
        Ok(values) => space.contains(values, shape),
        Err(_) => {
            let values: Vec<T> = x.as_array().iter().copied().collect();
            space.contains(&values, shape)
        }
    }
}

fn box_to_gymnasium<'py, T: Element + numpy::Element>(
    py: Python<'py>,
    space: &BoxSpace<T>,
) -> PyResult<Bound<'py, PyAny>> {
    let shape = PyTuple::new(py, space.shape())?;
    let low = PyArray1::from_slice(py, space.low()).reshape(space.shape())?;
    let high = PyArray1::from_slice(py, space.high()).reshape(space.shape())?;
    gymnasium_space(py, "Box")?.call1((low, high, shape, numpy::dtype::<T>(py)))
}

macro_rules! box_classes {
    ($($class:ident => $variant:ident, $t:ty, $name:literal;)*) => {
        $(
            #[doc = concat!("Per-element intervals over a shaped `", stringify!($t), "` buffer.")]
            #[pyclass(frozen, eq, module = "simbind._simbind", name = $name)]
            #[derive(PartialEq)]
            pub(crate) struct $class {
                pub(crate) inner: BoxSpace<$t>,
            }

            #[pymethods]
            impl $class {
                #[new]
                fn new(
                    low: &Bound<'_, PyAny>,
                    high: &Bound<'_, PyAny>,
                    shape: Vec<usize>,
                ) -> PyResult<Self> {
                    let low = bound_from_py::<$t>(low)?;
                    let high = bound_from_py::<$t>(high)?;
                    let inner = BoxSpace::new(low, high, &shape).map_err(space_err)?;
                    Ok(Self { inner })
                }

                /// Lower bounds, a read-only view of the space's storage.
                #[getter]
                fn low<'py>(slf: &Bound<'py, Self>) -> PyResult<Bound<'py, PyArrayDyn<$t>>> {
                    let space = &slf.get().inner;
                    // SAFETY: the space is frozen inside `slf`, which the
                    // array keeps alive as its base.
                    unsafe { alias_readonly(slf.clone().into_any(), space.low(), space.shape()) }
                }

                /// Upper bounds, a read-only view of the space's storage.
                #[getter]
                fn high<'py>(slf: &Bound<'py, Self>) -> PyResult<Bound<'py, PyArrayDyn<$t>>> {
                    let space = &slf.get().inner;
                    // SAFETY: as for `low`.
                    unsafe { alias_readonly(slf.clone().into_any(), space.high(), space.shape()) }
                }

                #[getter]
                fn shape<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyTuple>> {
                    PyTuple::new(py, self.inner.shape())
                }

                #[getter]
                fn dtype<'py>(&self, py: Python<'py>) -> Bound<'py, PyArrayDescr> {
                    numpy::dtype::<$t>(py)
                }

                /// Whether `x` has this shape and lies within the bounds.
                ///
                /// `x` is converted to this space's dtype first. A shape
                /// mismatch is not a member.
                fn contains<'py>(
                    &self,
                    x: PyArrayLikeDyn<'py, $t, AllowTypeChange>,
                ) -> bool {
                    box_contains(&self.inner, &x)
                }

                fn __contains__<'py>(
                    &self,
                    x: PyArrayLikeDyn<'py, $t, AllowTypeChange>,
                ) -> bool {
                    box_contains(&self.inner, &x)
                }

                fn __repr__(&self) -> String {
                    self.inner.to_string()
                }

                fn __reduce__<'py>(
                    slf: &Bound<'py, Self>,
                ) -> PyResult<(Bound<'py, PyAny>, (Bound<'py, PyTuple>,))> {
                    reduce(slf.as_any(), &slf.get().inner)
                }

                #[classmethod]
                fn _from_state(
                    _cls: &Bound<'_, PyType>,
                    state: &Bound<'_, PyTuple>,
                ) -> PyResult<Self> {
                    Ok(Self {
                        inner: restore(state)?,
                    })
                }

                /// The equivalent `gymnasium.spaces.Box`.
                fn to_gymnasium<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
                    box_to_gymnasium(py, &self.inner)
                }
            }
        )*

        /// Register every space class on `m`.
        pub(crate) fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
            m.add_class::<PyDiscrete>()?;
            m.add_class::<PyMultiDiscrete>()?;
            m.add_class::<PyMultiBinary>()?;
            $(m.add_class::<$class>()?;)*
            Ok(())
        }

        /// Wrap a core space in its Python class.
        pub(crate) fn space_to_py(py: Python<'_>, space: Space) -> PyResult<Bound<'_, PyAny>> {
            match space {
                Space::Discrete(inner) => Ok(Bound::new(py, PyDiscrete { inner })?.into_any()),
                Space::MultiDiscrete(inner) => {
                    Ok(Bound::new(py, PyMultiDiscrete { inner })?.into_any())
                }
                Space::MultiBinary(inner) => {
                    Ok(Bound::new(py, PyMultiBinary { inner })?.into_any())
                }
                $(
                    Space::Box(AnyBox::$variant(inner)) => {
                        Ok(Bound::new(py, $class { inner })?.into_any())
                    }
                )*
            }
        }
    };
}

box_classes! {
    PyBoxU8 => U8, u8, "BoxUint8";
    PyBoxI8 => I8, i8, "BoxInt8";
    PyBoxU16 => U16, u16, "BoxUint16";
    PyBoxI16 => I16, i16, "BoxInt16";
    PyBoxU32 => U32, u32, "BoxUint32";
    PyBoxI32 => I32, i32, "BoxInt32";
    PyBoxU64 => U64, u64, "BoxUint64";
    PyBoxI64 => I64, i64, "BoxInt64";
    PyBoxF32 => F32, f32, "BoxFloat32";
    PyBoxF64 => F64, f64, "BoxFloat64";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{np_array, with_module, with_python};
    use pyo3::exceptions::{PyTypeError, PyValueError};

    /// Rebuild `obj` the way `pickle` does, from `obj.__reduce__()`.
    fn rebuild<'py>(obj: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyAny>> {
        let (func, args): (Bound<'py, PyAny>, Bound<'py, PyTuple>) =
            obj.call_method0("__reduce__")?.extract()?;
        func.call1(args)
    }

    fn contains<'py>(space: &Bound<'py, PyAny>, x: impl IntoPyObject<'py>) -> PyResult<bool> {
        space.call_method1("contains", (x,))?.extract()
    }

    #[test]
    fn discrete_membership_from_python_ints() {
        with_python(|py| {
            let space = Bound::new(py, PyDiscrete::new(3))?.into_any();
            assert!(contains(&space, 2)?);
            assert!(!contains(&space, 3)?);
            assert!(!contains(&space, -1)?);
            let huge = py.eval(c"10 ** 30", None, None)?;
            assert!(!contains(&space, huge)?);
            assert!(space.contains(0)?);
            let err = contains(&space, "a").unwrap_err();
            assert!(err.is_instance_of::<PyTypeError>(py));
            Ok(())
        });
    }

    #[test]
    fn vector_membership_checks_length_and_range() {
        with_python(|py| {
            let md = Bound::new(py, PyMultiDiscrete::new(vec![2, 3]))?.into_any();
            assert!(contains(&md, vec![1, 2])?);
            assert!(!contains(&md, vec![1, 3])?);
            assert!(!contains(&md, vec![1])?);
            let mb = Bound::new(py, PyMultiBinary::new(3))?.into_any();
            assert!(contains(&mb, (1, 0, 1))?);
            assert!(!contains(&mb, (1, 2, 1))?);
            Ok(())
        });
    }

    #[test]
    fn reduce_round_trips_discrete_kinds() {
        with_python(|py| {
            let spaces = [
                Bound::new(py, PyDiscrete::new(7))?.into_any(),
                Bound::new(py, PyMultiDiscrete::new(vec![4, 1, 9]))?.into_any(),
                Bound::new(py, PyMultiBinary::new(5))?.into_any(),
            ];
            for space in &spaces {
                let back = rebuild(space)?;
                assert!(back.eq(space)?);
                assert_eq!(back.repr()?.to_string(), space.repr()?.to_string());
            }
            Ok(())
        });
    }

    #[test]
    fn from_state_checks_arity() {
        with_python(|py| {
            let cls = py.get_type::<PyDiscrete>();
            let err = cls
                .call_method1("_from_state", (PyTuple::new(py, [3u64, 4])?,))
                .unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
            let err = cls
                .call_method1("_from_state", (PyTuple::new(py, [-1i64])?,))
                .unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
            Ok(())
        });
    }

    #[test]
    fn repr_uses_compact_form() {
        with_python(|py| {
            let space = Bound::new(py, PyMultiDiscrete::new(vec![2, 3]))?;
            assert_eq!(space.repr()?.to_string(), "MultiDiscrete([2, 3])");
            Ok(())
        });
    }

    #[test]
    fn integer_box_bounds_are_exact() {
        with_module("numpy", |py| {
            let high = (1i64 << 53) + 1;
            let space = py
                .get_type::<PyBoxI64>()
                .call1((0, high, vec![1usize]))?
                .cast_into::<PyBoxI64>()?;
            assert_eq!(space.get().inner.high(), &[high]);

            let space = py
                .get_type::<PyBoxU64>()
                .call1((0u64, u64::MAX, vec![2usize]))?
                .cast_into::<PyBoxU64>()?;
            assert_eq!(space.get().inner.high(), &[u64::MAX, u64::MAX]);
            Ok(())
        });
    }

    #[test]
    fn float_scalar_bound_on_integer_box_is_a_type_error() {
        with_module("numpy", |py| {
            let err = py
                .get_type::<PyBoxI32>()
                .call1((0.5, 1, vec![1usize]))
                .unwrap_err();
            assert!(err.is_instance_of::<PyTypeError>(py));
            Ok(())
        });
    }

    #[test]
    fn box_accepts_per_element_bounds() {
        with_module("numpy", |py| {
            let high = np_array(py, vec![1.0, 1.0], "float64")?;
            let space = py
                .get_type::<PyBoxF32>()
                .call1((vec![0.0, -1.0], high, vec![2usize]))?
                .cast_into::<PyBoxF32>()?;
            assert_eq!(space.get().inner.low(), &[0.0, -1.0]);
            assert_eq!(space.get().inner.high(), &[1.0, 1.0]);
            Ok(())
        });
    }

    #[test]
    fn box_bounds_are_read_only_views_of_the_space() {
        with_module("numpy", |py| {
            let space = Bound::new(
                py,
                PyBoxF64 {
                    inner: BoxSpace::new(vec![0.0f64, 1.0, 2.0, 3.0], 9.0f64, &[2, 2])
                        .map_err(space_err)?,
                },
            )?;
            let low = space.getattr("low")?;
            assert!(low.getattr("base")?.is(&space));
            assert!(!low.getattr("flags")?.getattr("writeable")?.extract::<bool>()?);
            assert!(low.set_item((0, 0), 5.0).is_err());
            assert_eq!(low.getattr("shape")?.extract::<(usize, usize)>()?, (2, 2));
            assert_eq!(low.get_item((1, 0))?.extract::<f64>()?, 2.0);

            let typed = low.cast::<PyArrayDyn<f64>>()?;
            let ptr = typed.readonly().as_array().as_ptr();
            assert!(std::ptr::eq(ptr, space.get().inner.low().as_ptr()));
            Ok(())
        });
    }

    #[test]
    fn box_contains_force_casts_input() {
        with_module("numpy", |py| {
            let space = Bound::new(
                py,
                PyBoxF32 {
                    inner: BoxSpace::uniform(0.0f32, 1.0, &[2, 2]).map_err(space_err)?,
                },
            )?
            .into_any();
            assert!(contains(&space, vec![vec![0.5, 1.0], vec![0.0, 0.25]])?);
            assert!(contains(&space, vec![vec![0, 1], vec![1, 0]])?);
            let doubles = np_array(py, vec![vec![0.5, 0.5], vec![0.5, 0.5]], "float64")?;
            assert!(contains(&space, doubles)?);
            assert!(!contains(&space, vec![0.5, 0.5, 0.5, 0.5])?);
            assert!(!contains(&space, vec![vec![0.5, 1.5], vec![0.0, 0.0]])?);
            assert!(space.contains(vec![vec![0.1, 0.2], vec![0.3, 0.4]])?);
            Ok(())
        });
    }

    #[test]
    fn reduce_round_trips_boxes() {
        with_module("numpy", |py| {
            let space = Bound::new(
                py,
                PyBoxI16 {
                    inner: BoxSpace::new(vec![-3i16, 0, 2], 7i16, &[3]).map_err(space_err)?,
                },
            )?
            .into_any();
            let back = rebuild(&space)?;
            assert!(back.eq(&space)?);
            assert_eq!(back.repr()?.to_string(), "Box(-3, 7, [3])");
            Ok(())
        });
    }

    #[test]
    fn space_to_py_picks_the_box_class() {
        with_python(|py| {
            let space = Space::Box(AnyBox::U8(
                BoxSpace::uniform(0u8, 255, &[4]).map_err(space_err)?,
            ));
            let obj = space_to_py(py, space)?;
            assert!(obj.is_instance_of::<PyBoxU8>());
            assert_eq!(obj.get_type().name()?.to_string(), "BoxUint8");
            Ok(())
        });
    }

    #[test]
    fn converts_to_gymnasium_spaces() {
        with_module("gymnasium", |py| {
            let discrete = Bound::new(py, PyDiscrete::new(5))?;
            let gym = discrete.call_method0("to_gymnasium")?;
            assert_eq!(gym.getattr("n")?.extract::<i64>()?, 5);

            let boxed = Bound::new(
                py,
                PyBoxF32 {
                    inner: BoxSpace::uniform(-1.0f32, 1.0, &[3, 2]).map_err(space_err)?,
                },
            )?;
            let gym = boxed.call_method0("to_gymnasium")?;
            assert_eq!(gym.getattr("shape")?.extract::<(usize, usize)>()?, (3, 2));
            assert_eq!(gym.getattr("dtype")?.str()?.to_string(), "float32");
            Ok(())
        });
    }
}
