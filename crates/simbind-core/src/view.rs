//! Borrowed views over array fields.
//!
//! A view aliases the aggregate's own storage. Its lifetime is tied to the
//! borrow of the aggregate, so it can never outlive it; hosts that need
//! longer-lived handles must keep the aggregate alive themselves.

use crate::dtype::Element;
use crate::error::FieldError;
use crate::shape::{flat_index, Shape};
use crate::value::ElementSlice;

/// Row-major element strides for `shape`.
fn row_major_strides(shape: &[usize]) -> Shape {
    let mut strides: Shape = smallvec::smallvec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Immutable view over an array field.
#[derive(Clone, Copy, Debug)]
pub struct ArrayView<'a, T> {
    field: &'a str,
    data: &'a [T],
    shape: &'a [usize],
}

impl<'a, T: Element> ArrayView<'a, T> {
    pub(crate) fn new(field: &'a str, data: &'a [T], shape: &'a [usize]) -> Self {
        debug_assert_eq!(crate::shape::element_count(shape), Some(data.len()));
        Self { field, data, shape }
    }

    /// Name of the field this view was taken from.
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// Per-dimension extents.
    pub fn shape(&self) -> &'a [usize] {
        self.shape
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Row-major element strides.
    pub fn strides(&self) -> Shape {
        row_major_strides(self.shape)
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the view has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The elements in row-major order.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Address of the first element. Equal to the field's own address.
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<&'a T> {
        flat_index(self.shape, index).map(|i| &self.data[i])
    }

    /// The elements as a dtype-tagged slice.
    pub fn elements(&self) -> ElementSlice<'a> {
        ElementSlice::of(self.data)
    }

    /// Copy the elements out.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.to_vec()
    }
}

/// Mutable view over a writable array field.
#[derive(Debug)]
pub struct ArrayViewMut<'a, T> {
    field: &'a str,
    data: &'a mut [T],
    shape: &'a [usize],
}

impl<'a, T: Element> ArrayViewMut<'a, T> {
    pub(crate) fn new(field: &'a str, data: &'a mut [T], shape: &'a [usize]) -> Self {
        debug_assert_eq!(crate::shape::element_count(shape), Some(data.len()));
        Self { field, data, shape }
    }

    /// Name of the field this view was taken from.
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// Per-dimension extents.
    pub fn shape(&self) -> &'a [usize] {
        self.shape
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the view has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The elements in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &*self.data
    }

    /// Mutable access to the elements in row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }

    /// Address of the first element.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    /// Element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        flat_index(self.shape, index).map(|i| &self.data[i])
    }

    /// Mutable element at a multi-dimensional index.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        flat_index(self.shape, index).map(move |i| &mut self.data[i])
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Overwrite all elements from `src`, converting element types.
    ///
    /// Fails with [`FieldError::ShapeMismatch`] before copying anything if
    /// `src` does not hold exactly [`len`](Self::len) elements.
    pub fn write<S: Element>(&mut self, src: &[S]) -> Result<(), FieldError> {
        self.check_len(src.len())?;
        crate::copy::copy_with_coercion(src, &mut *self.data);
        Ok(())
    }

    /// Dtype-tagged counterpart of [`write`](Self::write).
    pub fn write_elements(&mut self, src: ElementSlice<'_>) -> Result<(), FieldError> {
        self.check_len(src.len())?;
        if src.dtype() != T::DTYPE {
            tracing::trace!(
                field = self.field,
                from = %src.dtype(),
                to = %T::DTYPE,
                "coercing array write"
            );
        }
        src.copy_into(&mut *self.data);
        Ok(())
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> ArrayView<'_, T> {
        ArrayView::new(self.field, &*self.data, self.shape)
    }

    fn check_len(&self, actual: usize) -> Result<(), FieldError> {
        if actual != self.data.len() {
            return Err(FieldError::ShapeMismatch {
                field: self.field.to_string(),
                expected: self.data.len(),
                actual,
            });
        }
        Ok(())
    }
}
