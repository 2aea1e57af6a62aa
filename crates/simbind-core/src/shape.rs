//! Array shapes and compile-time extent extraction.

use bytemuck::Pod;
use smallvec::SmallVec;

use crate::dtype::Element;

/// Per-dimension extents, outermost first.
///
/// Four inline slots cover every field shape seen in practice without
/// a heap allocation.
pub type Shape = SmallVec<[usize; 4]>;

/// Number of elements described by `extents`, or `None` on overflow.
///
/// The empty shape describes a single element, matching the usual
/// product-of-nothing convention.
pub fn element_count(extents: &[usize]) -> Option<usize> {
    extents
        .iter()
        .try_fold(1usize, |acc, &e| acc.checked_mul(e))
}

/// Row-major flat offset of `index` within `shape`.
///
/// Returns `None` if the rank differs or any coordinate is out of range.
pub fn flat_index(shape: &[usize], index: &[usize]) -> Option<usize> {
    if shape.len() != index.len() {
        return None;
    }
    let mut offset = 0usize;
    for (&extent, &i) in shape.iter().zip(index) {
        if i >= extent {
            return None;
        }
        offset = offset * extent + i;
    }
    Some(offset)
}

/// A fixed-size, possibly nested, array of [`Element`]s.
///
/// The shape is read off the type itself: `[[f32; 3]; 2]` has extents
/// `[2, 3]`, and a bare element has rank 0. Storage is contiguous and
/// row-major, so [`flatten`](FixedShape::flatten) exposes it as one slice
/// without copying.
///
/// # Examples
///
/// ```
/// use simbind_core::FixedShape;
///
/// assert_eq!(<[[f32; 3]; 2]>::shape().as_slice(), &[2, 3]);
/// assert_eq!(<[[f32; 3]; 2]>::RANK, 2);
///
/// let a = [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
/// assert_eq!(a.flatten(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// ```
pub trait FixedShape: Pod {
    /// The innermost element type.
    type Elem: Element;

    /// Number of array dimensions.
    const RANK: usize;

    /// Append this type's extents, outermost first, to `out`.
    fn push_extents(out: &mut Shape);

    /// The full shape of this type.
    fn shape() -> Shape {
        let mut shape = Shape::new();
        Self::push_extents(&mut shape);
        shape
    }

    /// View the storage as a flat row-major slice.
    fn flatten(&self) -> &[Self::Elem] {
        if std::mem::size_of::<Self>() == 0 {
            return &[];
        }
        bytemuck::cast_slice(std::slice::from_ref(self))
    }

    /// Mutable counterpart of [`flatten`](FixedShape::flatten).
    fn flatten_mut(&mut self) -> &mut [Self::Elem] {
        if std::mem::size_of::<Self>() == 0 {
            return &mut [];
        }
        bytemuck::cast_slice_mut(std::slice::from_mut(self))
    }
}

macro_rules! impl_scalar_shape {
    ($($t:ty),*) => {
        $(
            impl FixedShape for $t {
                type Elem = $t;
                const RANK: usize = 0;

                fn push_extents(_out: &mut Shape) {}
            }
        )*
    };
}

impl_scalar_shape!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl<F: FixedShape, const N: usize> FixedShape for [F; N]
where
    [F; N]: Pod,
{
    type Elem = F::Elem;
    const RANK: usize = F::RANK + 1;

    fn push_extents(out: &mut Shape) {
        out.push(N);
        F::push_extents(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_count_of_empty_shape_is_one() {
        assert_eq!(element_count(&[]), Some(1));
        assert_eq!(element_count(&[2, 3, 4]), Some(24));
        assert_eq!(element_count(&[5, 0]), Some(0));
    }

    #[test]
    fn element_count_detects_overflow() {
        assert_eq!(element_count(&[usize::MAX, 2]), None);
    }

    #[test]
    fn flat_index_is_row_major() {
        let shape = [2, 3];
        assert_eq!(flat_index(&shape, &[0, 0]), Some(0));
        assert_eq!(flat_index(&shape, &[0, 2]), Some(2));
        assert_eq!(flat_index(&shape, &[1, 0]), Some(3));
        assert_eq!(flat_index(&shape, &[1, 2]), Some(5));
    }

    #[test]
    fn flat_index_rejects_bad_coordinates() {
        assert_eq!(flat_index(&[2, 3], &[2, 0]), None);
        assert_eq!(flat_index(&[2, 3], &[1]), None);
        assert_eq!(flat_index(&[2, 3], &[0, 0, 0]), None);
    }

    #[test]
    fn scalar_has_rank_zero() {
        assert_eq!(<f64 as FixedShape>::RANK, 0);
        assert!(<f64 as FixedShape>::shape().is_empty());
        assert_eq!(2.5f64.flatten(), &[2.5]);
    }

    #[test]
    fn nested_extents_outermost_first() {
        assert_eq!(<[[[u8; 4]; 3]; 2]>::shape().as_slice(), &[2, 3, 4]);
        assert_eq!(<[[[u8; 4]; 3]; 2]>::RANK, 3);
    }

    #[test]
    fn flatten_mut_aliases_storage() {
        let mut a = [[0i16; 2]; 2];
        a.flatten_mut()[3] = 7;
        assert_eq!(a[1][1], 7);
    }

    #[test]
    fn zero_extent_flattens_to_empty() {
        let a: [[f32; 0]; 3] = [[]; 3];
        assert!(a.flatten().is_empty());
        assert_eq!(<[[f32; 0]; 3]>::shape().as_slice(), &[3, 0]);
    }
}
