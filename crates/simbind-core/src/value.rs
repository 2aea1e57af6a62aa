//! Dtype-tagged values and buffers.
//!
//! A dynamically-typed host hands over numbers whose element type is only
//! known at run time. [`ScalarValue`], [`ElementSlice`] and
//! [`ElementBuffer`] carry that type as an enum tag, and convert into a
//! statically-typed destination with [`Element::cast`] semantics.

use crate::copy::copy_with_coercion;
use crate::dtype::{DType, Element};

macro_rules! dispatch {
    ($value:expr, $bind:ident => $body:expr) => {
        match $value {
            Self::U8($bind) => $body,
            Self::I8($bind) => $body,
            Self::U16($bind) => $body,
            Self::I16($bind) => $body,
            Self::U32($bind) => $body,
            Self::I32($bind) => $body,
            Self::U64($bind) => $body,
            Self::I64($bind) => $body,
            Self::F32($bind) => $body,
            Self::F64($bind) => $body,
        }
    };
}

macro_rules! from_typed {
    ($dtype:expr, $conv:expr) => {
        match $dtype {
            DType::U8 => Self::U8($conv),
            DType::I8 => Self::I8($conv),
            DType::U16 => Self::U16($conv),
            DType::I16 => Self::I16($conv),
            DType::U32 => Self::U32($conv),
            DType::I32 => Self::I32($conv),
            DType::U64 => Self::U64($conv),
            DType::I64 => Self::I64($conv),
            DType::F32 => Self::F32($conv),
            DType::F64 => Self::F64($conv),
        }
    };
}

// ── ScalarValue ─────────────────────────────────────────────────────

/// A single number tagged with its element type.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum ScalarValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl ScalarValue {
    /// Tag a typed value.
    pub fn of<T: Element>(value: T) -> Self {
        from_typed!(T::DTYPE, value.cast())
    }

    /// The element type of the value.
    pub fn dtype(&self) -> DType {
        dispatch!(self, v => element_dtype(v))
    }

    /// Convert to `T` with `as` semantics.
    pub fn cast<T: Element>(self) -> T {
        dispatch!(self, v => v.cast())
    }
}

macro_rules! scalar_from {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<$t> for ScalarValue {
                fn from(v: $t) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

scalar_from!(
    u8 => U8, i8 => I8, u16 => U16, i16 => I16, u32 => U32,
    i32 => I32, u64 => U64, i64 => I64, f32 => F32, f64 => F64
);

fn element_dtype<T: Element>(_: &T) -> DType {
    T::DTYPE
}

fn slice_dtype<T: Element>(_: &[T]) -> DType {
    T::DTYPE
}

// ── ElementSlice ────────────────────────────────────────────────────

/// A borrowed buffer tagged with its element type.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum ElementSlice<'a> {
    U8(&'a [u8]),
    I8(&'a [i8]),
    U16(&'a [u16]),
    I16(&'a [i16]),
    U32(&'a [u32]),
    I32(&'a [i32]),
    U64(&'a [u64]),
    I64(&'a [i64]),
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl<'a> ElementSlice<'a> {
    /// Tag a typed slice. No data is copied.
    pub fn of<T: Element>(slice: &'a [T]) -> Self {
        from_typed!(T::DTYPE, bytemuck::cast_slice(slice))
    }

    /// The element type of the buffer.
    pub fn dtype(&self) -> DType {
        dispatch!(*self, s => slice_dtype(s))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        dispatch!(self, s => s.len())
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw bytes of the buffer, in native byte order.
    pub fn as_bytes(&self) -> &'a [u8] {
        dispatch!(*self, s => bytemuck::cast_slice(s))
    }

    /// Borrow the buffer as `&[T]` if the dtype matches exactly.
    pub fn downcast<T: Element>(&self) -> Option<&'a [T]> {
        if self.dtype() != T::DTYPE {
            return None;
        }
        Some(dispatch!(*self, s => bytemuck::cast_slice(s)))
    }

    /// Coercing copy into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst.len() != self.len()`.
    pub fn copy_into<T: Element>(&self, dst: &mut [T]) {
        dispatch!(*self, s => copy_with_coercion(s, dst))
    }

    /// Collect into a `Vec<T>` with `as` semantics.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        dispatch!(*self, s => s.iter().map(|v| v.cast()).collect())
    }
}

// ── ElementSliceMut ─────────────────────────────────────────────────

/// A mutably borrowed buffer tagged with its element type.
#[derive(Debug, PartialEq)]
#[allow(missing_docs)]
pub enum ElementSliceMut<'a> {
    U8(&'a mut [u8]),
    I8(&'a mut [i8]),
    U16(&'a mut [u16]),
    I16(&'a mut [i16]),
    U32(&'a mut [u32]),
    I32(&'a mut [i32]),
    U64(&'a mut [u64]),
    I64(&'a mut [i64]),
    F32(&'a mut [f32]),
    F64(&'a mut [f64]),
}

impl<'a> ElementSliceMut<'a> {
    /// Tag a typed mutable slice. No data is copied.
    pub fn of<T: Element>(slice: &'a mut [T]) -> Self {
        from_typed!(T::DTYPE, bytemuck::cast_slice_mut(slice))
    }

    /// The element type of the buffer.
    pub fn dtype(&self) -> DType {
        self.as_slice().dtype()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reborrow immutably.
    pub fn as_slice(&self) -> ElementSlice<'_> {
        match self {
            Self::U8(v) => ElementSlice::U8(v),
            Self::I8(v) => ElementSlice::I8(v),
            Self::U16(v) => ElementSlice::U16(v),
            Self::I16(v) => ElementSlice::I16(v),
            Self::U32(v) => ElementSlice::U32(v),
            Self::I32(v) => ElementSlice::I32(v),
            Self::U64(v) => ElementSlice::U64(v),
            Self::I64(v) => ElementSlice::I64(v),
            Self::F32(v) => ElementSlice::F32(v),
            Self::F64(v) => ElementSlice::F64(v),
        }
    }
}

// ── ElementBuffer ───────────────────────────────────────────────────

/// An owned buffer tagged with its element type.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum ElementBuffer {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    U64(Vec<u64>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl ElementBuffer {
    /// Copy a typed slice into a tagged buffer.
    pub fn from_slice<T: Element>(values: &[T]) -> Self {
        from_typed!(T::DTYPE, values.iter().map(|v| v.cast()).collect())
    }

    /// Borrow as an [`ElementSlice`].
    pub fn as_slice(&self) -> ElementSlice<'_> {
        match self {
            Self::U8(v) => ElementSlice::U8(v),
            Self::I8(v) => ElementSlice::I8(v),
            Self::U16(v) => ElementSlice::U16(v),
            Self::I16(v) => ElementSlice::I16(v),
            Self::U32(v) => ElementSlice::U32(v),
            Self::I32(v) => ElementSlice::I32(v),
            Self::U64(v) => ElementSlice::U64(v),
            Self::I64(v) => ElementSlice::I64(v),
            Self::F32(v) => ElementSlice::F32(v),
            Self::F64(v) => ElementSlice::F64(v),
        }
    }

    /// The element type of the buffer.
    pub fn dtype(&self) -> DType {
        self.as_slice().dtype()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect into a `Vec<T>` with `as` semantics.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<T: Element> From<Vec<T>> for ElementBuffer {
    fn from(values: Vec<T>) -> Self {
        Self::from_slice(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_of_keeps_dtype() {
        assert_eq!(ScalarValue::of(3u16), ScalarValue::U16(3));
        assert_eq!(ScalarValue::of(-1.5f32).dtype(), DType::F32);
        assert_eq!(ScalarValue::from(7i64), ScalarValue::I64(7));
    }

    #[test]
    fn scalar_cast_uses_as() {
        assert_eq!(ScalarValue::F64(2.9).cast::<u8>(), 2);
        assert_eq!(ScalarValue::I32(-1).cast::<u32>(), u32::MAX);
    }

    #[test]
    fn slice_of_does_not_copy() {
        let data = [1.0f64, 2.0];
        let slice = ElementSlice::of(&data);
        assert_eq!(slice.dtype(), DType::F64);
        assert_eq!(slice.len(), 2);
        let back = slice.downcast::<f64>().unwrap();
        assert!(std::ptr::eq(back.as_ptr(), data.as_ptr()));
    }

    #[test]
    fn mutable_slice_writes_through() {
        let mut data = [1i16, 2, 3];
        let ptr = data.as_ptr();
        let mut slice = ElementSliceMut::of(&mut data);
        assert_eq!(slice.dtype(), DType::I16);
        assert_eq!(slice.len(), 3);
        let ElementSliceMut::I16(values) = &mut slice else {
            panic!("expected an int16 slice");
        };
        assert!(std::ptr::eq(values.as_ptr(), ptr));
        values[1] = -7;
        assert_eq!(data, [1, -7, 3]);
    }

    #[test]
    fn downcast_rejects_other_dtypes() {
        let data = [1u32, 2];
        assert!(ElementSlice::of(&data).downcast::<i32>().is_none());
    }

    #[test]
    fn copy_into_coerces() {
        let data = [1.7f32, -2.2];
        let mut dst = [0i8; 2];
        ElementSlice::of(&data).copy_into(&mut dst);
        assert_eq!(dst, [1, -2]);
    }

    #[test]
    fn bytes_are_native_layout() {
        let data = [1u16, 2];
        let bytes = ElementSlice::of(&data).as_bytes();
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes, bytemuck::cast_slice::<u16, u8>(&data));
    }

    #[test]
    fn buffer_round_trips_through_slice() {
        let buffer = ElementBuffer::from(vec![1i32, -4, 9]);
        assert_eq!(buffer.dtype(), DType::I32);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.to_vec::<f64>(), vec![1.0, -4.0, 9.0]);
        assert_eq!(buffer.as_slice().to_vec::<i32>(), vec![1, -4, 9]);
    }
}
