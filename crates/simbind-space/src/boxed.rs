//! `Box`: per-element closed intervals over a shaped buffer.
//!
//! [`BoxSpace<T>`] is generic over the ten element types; [`AnyBox`] erases
//! the element type for code that only learns it at run time.

use std::fmt;

use simbind_core::{element_count, DType, Element, ElementSlice, Shape};

use crate::error::SpaceError;
use crate::model::SpaceModel;
use crate::state::{StateReader, StateValue};

/// One bound of a box: a single value for every element, or one per element.
#[derive(Clone, Debug, PartialEq)]
pub enum Bound<T> {
    /// The same value for every element.
    Uniform(T),
    /// One value per element, in row-major order.
    Each(Vec<T>),
}

impl<T: Element> Bound<T> {
    fn expand(self, what: &'static str, size: usize) -> Result<Vec<T>, SpaceError> {
        match self {
            Self::Uniform(v) => Ok(vec![v; size]),
            Self::Each(values) if values.len() == size => Ok(values),
            Self::Each(values) => Err(SpaceError::ShapeMismatch {
                what,
                expected: size,
                actual: values.len(),
            }),
        }
    }
}

impl<T: Element> From<T> for Bound<T> {
    fn from(value: T) -> Self {
        Self::Uniform(value)
    }
}

impl<T: Element> From<Vec<T>> for Bound<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Each(values)
    }
}

impl<T: Element> From<&[T]> for Bound<T> {
    fn from(values: &[T]) -> Self {
        Self::Each(values.to_vec())
    }
}

impl<T: Element, const N: usize> From<[T; N]> for Bound<T> {
    fn from(values: [T; N]) -> Self {
        Self::Each(values.to_vec())
    }
}

/// Buffers `x` of a fixed shape with `low[i] <= x[i] <= high[i]`.
///
/// `low[i] <= high[i]` is not checked; a box with an inverted interval is
/// legal and simply has no members.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxSpace<T> {
    low: Vec<T>,
    high: Vec<T>,
    shape: Shape,
}

fn shape_size(shape: &[usize]) -> Result<usize, SpaceError> {
    element_count(shape).ok_or_else(|| SpaceError::InvalidShape {
        reason: format!("element count of {shape:?} overflows usize"),
    })
}

impl<T: Element> BoxSpace<T> {
    /// Box of the given shape with scalar or per-element bounds.
    ///
    /// Fails with [`SpaceError::ShapeMismatch`] if a per-element bound does
    /// not hold exactly `product(shape)` values.
    ///
    /// # Examples
    ///
    /// ```
    /// use simbind_space::BoxSpace;
    ///
    /// let space = BoxSpace::<f32>::new(0.0, vec![1.0, 2.0], &[2]).unwrap();
    /// assert!(space.contains(&[0.5, 2.0], &[2]));
    /// assert!(BoxSpace::new(vec![0.0f32, 0.0], vec![1.0, 1.0, 1.0], &[3]).is_err());
    /// ```
    pub fn new(
        low: impl Into<Bound<T>>,
        high: impl Into<Bound<T>>,
        shape: &[usize],
    ) -> Result<Self, SpaceError> {
        let size = shape_size(shape)?;
        let low = low.into().expand("low", size)?;
        let high = high.into().expand("high", size)?;
        Ok(Self {
            low,
            high,
            shape: Shape::from_slice(shape),
        })
    }

    /// Box with the same interval for every element.
    pub fn uniform(low: T, high: T, shape: &[usize]) -> Result<Self, SpaceError> {
        Self::new(low, high, shape)
    }

    /// One-dimensional box whose shape is the length of the bounds.
    pub fn flat(low: Vec<T>, high: Vec<T>) -> Result<Self, SpaceError> {
        let shape = [low.len()];
        Self::new(low, high, &shape)
    }

    /// Lower bounds, row-major.
    pub fn low(&self) -> &[T] {
        &self.low
    }

    /// Upper bounds, row-major.
    pub fn high(&self) -> &[T] {
        &self.high
    }

    /// Per-dimension extents.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements, the product of the shape.
    pub fn size(&self) -> usize {
        self.low.len()
    }

    /// Returns `true` if `values` has exactly this box's shape and every
    /// element lies within its bounds, inclusive.
    ///
    /// A rank or extent mismatch is not an error; it is simply not a
    /// member. NaN is never a member.
    pub fn contains(&self, values: &[T], shape: &[usize]) -> bool {
        shape == self.shape.as_slice()
            && values.len() == self.size()
            && values
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Like [`contains`](Self::contains) for a buffer of any element type,
    /// which is first converted to `T` with `as` semantics.
    pub fn contains_elements(&self, values: ElementSlice<'_>, shape: &[usize]) -> bool {
        if shape != self.shape.as_slice() || values.len() != self.size() {
            return false;
        }
        match values.downcast::<T>() {
            Some(typed) => self.contains(typed, shape),
            None => self.contains(&values.to_vec::<T>(), shape),
        }
    }

    fn min_low(&self) -> Option<T> {
        self.low
            .iter()
            .copied()
            .reduce(|a, b| if b < a { b } else { a })
    }

    fn max_high(&self) -> Option<T> {
        self.high
            .iter()
            .copied()
            .reduce(|a, b| if b > a { b } else { a })
    }
}

impl<T: Element> SpaceModel for BoxSpace<T> {
    const NAME: &'static str = "Box";
    const ARITY: usize = 3;

    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn to_state(&self) -> Vec<StateValue> {
        vec![
            StateValue::elements(&self.low),
            StateValue::elements(&self.high),
            StateValue::shape(&self.shape),
        ]
    }

    fn from_state(state: &[StateValue]) -> Result<Self, SpaceError> {
        let reader = StateReader::new(Self::NAME, Self::ARITY, state)?;
        let low = reader.elements::<T>(0)?;
        let high = reader.elements::<T>(1)?;
        let shape = reader.extents(2)?;
        Self::new(low, high, &shape)
    }
}

struct Extremum<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for Extremum<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => fmt::Display::fmt(v, f),
            None => f.write_str("-"),
        }
    }
}

/// Compact summary: global minimum of `low`, global maximum of `high`,
/// and the shape.
impl<T: Element> fmt::Display for BoxSpace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Box({}, {}, {:?})",
            Extremum(self.min_low()),
            Extremum(self.max_high()),
            self.shape.as_slice()
        )
    }
}

// ── AnyBox ──────────────────────────────────────────────────────────

macro_rules! dispatch {
    ($value:expr, $bind:ident => $body:expr) => {
        match $value {
            AnyBox::U8($bind) => $body,
            AnyBox::I8($bind) => $body,
            AnyBox::U16($bind) => $body,
            AnyBox::I16($bind) => $body,
            AnyBox::U32($bind) => $body,
            AnyBox::I32($bind) => $body,
            AnyBox::U64($bind) => $body,
            AnyBox::I64($bind) => $body,
            AnyBox::F32($bind) => $body,
            AnyBox::F64($bind) => $body,
        }
    };
}

/// A [`BoxSpace`] of any element type.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum AnyBox {
    U8(BoxSpace<u8>),
    I8(BoxSpace<i8>),
    U16(BoxSpace<u16>),
    I16(BoxSpace<i16>),
    U32(BoxSpace<u32>),
    I32(BoxSpace<i32>),
    U64(BoxSpace<u64>),
    I64(BoxSpace<i64>),
    F32(BoxSpace<f32>),
    F64(BoxSpace<f64>),
}

impl AnyBox {
    /// Element type of the box.
    pub fn dtype(&self) -> DType {
        dispatch!(self, b => b.dtype())
    }

    /// Per-dimension extents.
    pub fn shape(&self) -> &[usize] {
        dispatch!(self, b => b.shape())
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        dispatch!(self, b => b.size())
    }

    /// Lower bounds, tagged with the element type.
    pub fn low(&self) -> ElementSlice<'_> {
        dispatch!(self, b => ElementSlice::of(b.low()))
    }

    /// Upper bounds, tagged with the element type.
    pub fn high(&self) -> ElementSlice<'_> {
        dispatch!(self, b => ElementSlice::of(b.high()))
    }

    /// Membership test for a buffer of any element type.
    pub fn contains(&self, values: ElementSlice<'_>, shape: &[usize]) -> bool {
        dispatch!(self, b => b.contains_elements(values, shape))
    }

    /// Serialize to `(low, high, shape)`.
    pub fn to_state(&self) -> Vec<StateValue> {
        dispatch!(self, b => b.to_state())
    }

    /// Rebuild a box of element type `dtype` from its state.
    pub fn from_state(dtype: DType, state: &[StateValue]) -> Result<Self, SpaceError> {
        Ok(match dtype {
            DType::U8 => Self::U8(BoxSpace::from_state(state)?),
            DType::I8 => Self::I8(BoxSpace::from_state(state)?),
            DType::U16 => Self::U16(BoxSpace::from_state(state)?),
            DType::I16 => Self::I16(BoxSpace::from_state(state)?),
            DType::U32 => Self::U32(BoxSpace::from_state(state)?),
            DType::I32 => Self::I32(BoxSpace::from_state(state)?),
            DType::U64 => Self::U64(BoxSpace::from_state(state)?),
            DType::I64 => Self::I64(BoxSpace::from_state(state)?),
            DType::F32 => Self::F32(BoxSpace::from_state(state)?),
            DType::F64 => Self::F64(BoxSpace::from_state(state)?),
        })
    }
}

impl fmt::Display for AnyBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, b => fmt::Display::fmt(b, f))
    }
}

macro_rules! any_box_from {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<BoxSpace<$t>> for AnyBox {
                fn from(space: BoxSpace<$t>) -> Self {
                    Self::$variant(space)
                }
            }
        )*
    };
}

any_box_from!(
    u8 => U8, i8 => I8, u16 => U16, i16 => I16, u32 => U32,
    i32 => I32, u64 => U64, i64 => I64, f32 => F32, f64 => F64
);
