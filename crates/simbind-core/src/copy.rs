//! Bulk copy between element buffers of possibly different types.

use crate::dtype::Element;

/// Copy `src` into `dst`, converting each element to the destination type.
///
/// When `S` and `T` are the same type this is a plain `copy_from_slice`.
/// Otherwise every element goes through [`Element::cast`], i.e. Rust's `as`
/// operator. Precision loss is silent.
///
/// # Panics
///
/// Panics if the two slices have different lengths, like
/// [`slice::copy_from_slice`]. Callers validate lengths first.
///
/// # Examples
///
/// ```
/// use simbind_core::copy_with_coercion;
///
/// let mut dst = [0i32; 2];
/// copy_with_coercion(&[1.7f64, 2.9], &mut dst);
/// assert_eq!(dst, [1, 2]);
/// ```
pub fn copy_with_coercion<S: Element, T: Element>(src: &[S], dst: &mut [T]) {
    assert_eq!(
        src.len(),
        dst.len(),
        "coercing copy between slices of different lengths"
    );
    if S::DTYPE == T::DTYPE {
        dst.copy_from_slice(bytemuck::cast_slice(src));
    } else {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s.cast();
        }
    }
}
