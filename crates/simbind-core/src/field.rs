//! Field descriptors: bind-time metadata for one member of an aggregate.
//!
//! A descriptor never owns the aggregate. It holds the field's name, an
//! optional doc string, the read-only flag and a pair of accessor
//! functions, and is immutable once built. The borrow checker ties every
//! view it hands out to the borrow of the aggregate it was taken from.
//!
//! The [`scalar_field!`](crate::scalar_field), [`array_field!`](crate::array_field)
//! and [`opaque_field!`](crate::opaque_field) macros build descriptors from
//! a type and a member name.

use bytemuck::NoUninit;

use crate::dtype::{DType, Element};
use crate::error::FieldError;
use crate::shape::{element_count, FixedShape, Shape};
use crate::value::{ElementSlice, ScalarValue};
use crate::view::{ArrayView, ArrayViewMut};

/// Name, documentation and writability of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMeta {
    /// Member name as exposed to the host.
    pub name: String,
    /// Optional documentation string.
    pub doc: Option<String>,
    /// Whether writes are rejected.
    pub read_only: bool,
}

impl FieldMeta {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            read_only: false,
        }
    }

    fn read_only_violation(&self) -> FieldError {
        FieldError::ReadOnlyViolation {
            field: self.name.clone(),
        }
    }
}

// ── ScalarField ─────────────────────────────────────────────────────

/// Descriptor for a single numeric member, accessed by value.
pub struct ScalarField<A, T> {
    meta: FieldMeta,
    get: fn(&A) -> &T,
    get_mut: fn(&mut A) -> &mut T,
}

impl<A, T: Element> ScalarField<A, T> {
    /// Describe a writable scalar member.
    pub fn new(
        name: impl Into<String>,
        get: fn(&A) -> &T,
        get_mut: fn(&mut A) -> &mut T,
    ) -> Self {
        Self {
            meta: FieldMeta::new(name),
            get,
            get_mut,
        }
    }

    /// Mark the field read-only.
    pub fn read_only(mut self) -> Self {
        self.meta.read_only = true;
        self
    }

    /// Attach a documentation string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.meta.doc = Some(doc.into());
        self
    }

    /// Name, doc and writability.
    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Element type of the field.
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Current value of the field.
    pub fn get(&self, aggregate: &A) -> T {
        *(self.get)(aggregate)
    }

    /// Overwrite the field.
    pub fn set(&self, aggregate: &mut A, value: T) -> Result<(), FieldError> {
        if self.meta.read_only {
            return Err(self.meta.read_only_violation());
        }
        *(self.get_mut)(aggregate) = value;
        Ok(())
    }

    /// Overwrite the field from a dtype-tagged value, converting with `as`.
    pub fn set_dyn(&self, aggregate: &mut A, value: ScalarValue) -> Result<(), FieldError> {
        if value.dtype() != T::DTYPE {
            tracing::trace!(
                field = %self.meta.name,
                from = %value.dtype(),
                to = %T::DTYPE,
                "coercing scalar write"
            );
        }
        self.set(aggregate, value.cast())
    }
}

impl<A, T> std::fmt::Debug for ScalarField<A, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarField")
            .field("meta", &self.meta)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

// ── ArrayField ──────────────────────────────────────────────────────

/// Descriptor for a fixed-size, possibly nested, array member.
///
/// The shape comes from the member's type: an `ArrayField<A, [[f32; 3]; 2]>`
/// always has shape `[2, 3]` and six `f32` elements.
pub struct ArrayField<A, F: FixedShape> {
    meta: FieldMeta,
    shape: Shape,
    size: usize,
    get: fn(&A) -> &F,
    get_mut: fn(&mut A) -> &mut F,
}

impl<A, F: FixedShape> ArrayField<A, F> {
    /// Describe a writable array member.
    ///
    /// Fails with [`FieldError::InvalidShape`] if `F` is a bare element
    /// rather than an array.
    pub fn new(
        name: impl Into<String>,
        get: fn(&A) -> &F,
        get_mut: fn(&mut A) -> &mut F,
    ) -> Result<Self, FieldError> {
        let meta = FieldMeta::new(name);
        if F::RANK == 0 {
            return Err(FieldError::InvalidShape {
                field: meta.name,
                reason: format!(
                    "{} is not an array type; bind it as a scalar",
                    std::any::type_name::<F>()
                ),
            });
        }
        let shape = F::shape();
        let size = element_count(&shape).ok_or_else(|| FieldError::InvalidShape {
            field: meta.name.clone(),
            reason: format!("element count of {shape:?} overflows usize"),
        })?;
        Ok(Self {
            meta,
            shape,
            size,
            get,
            get_mut,
        })
    }

    /// Mark the field read-only.
    pub fn read_only(mut self) -> Self {
        self.meta.read_only = true;
        self
    }

    /// Attach a documentation string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.meta.doc = Some(doc.into());
        self
    }

    /// Name, doc and writability.
    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Per-dimension extents, outermost first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements, the product of the shape.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Element type of the field.
    pub fn dtype(&self) -> DType {
        <F::Elem as Element>::DTYPE
    }

    /// Immutable view over the field's storage. Always permitted.
    pub fn view<'a>(&'a self, aggregate: &'a A) -> ArrayView<'a, F::Elem> {
        ArrayView::new(&self.meta.name, (self.get)(aggregate).flatten(), &self.shape)
    }

    /// The elements in row-major order, aliasing the aggregate.
    pub fn elements<'a>(&self, aggregate: &'a A) -> &'a [F::Elem] {
        (self.get)(aggregate).flatten()
    }

    /// The field's storage in row-major order, for writing.
    ///
    /// Fails with [`FieldError::ReadOnlyViolation`] on read-only fields.
    pub fn elements_mut<'a>(&self, aggregate: &'a mut A) -> Result<&'a mut [F::Elem], FieldError> {
        if self.meta.read_only {
            return Err(self.meta.read_only_violation());
        }
        Ok((self.get_mut)(aggregate).flatten_mut())
    }

    /// Mutable view over the field's storage.
    pub fn view_mut<'a>(
        &'a self,
        aggregate: &'a mut A,
    ) -> Result<ArrayViewMut<'a, F::Elem>, FieldError> {
        if self.meta.read_only {
            return Err(self.meta.read_only_violation());
        }
        Ok(ArrayViewMut::new(
            &self.meta.name,
            (self.get_mut)(aggregate).flatten_mut(),
            &self.shape,
        ))
    }

    /// Overwrite every element from `src`, converting element types.
    ///
    /// The read-only check runs first, then the length check; nothing is
    /// written unless both pass.
    pub fn write<S: Element>(&self, aggregate: &mut A, src: &[S]) -> Result<(), FieldError> {
        self.view_mut(aggregate)?.write(src)
    }

    /// Dtype-tagged counterpart of [`write`](Self::write).
    pub fn write_dyn(&self, aggregate: &mut A, src: ElementSlice<'_>) -> Result<(), FieldError> {
        self.view_mut(aggregate)?.write_elements(src)
    }
}

impl<A, F: FixedShape> std::fmt::Debug for ArrayField<A, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayField")
            .field("meta", &self.meta)
            .field("shape", &self.shape)
            .field("dtype", &self.dtype())
            .finish()
    }
}

// ── OpaqueField ─────────────────────────────────────────────────────

/// Fallback descriptor for a member whose type is itself an aggregate.
///
/// Only an immutable window over the member's bytes is available; the
/// inner structure is lost. Building one logs a warning, since a proper
/// binding would describe the nested aggregate with its own layout.
pub struct OpaqueField<A, F> {
    meta: FieldMeta,
    shape: [usize; 1],
    get: fn(&A) -> &F,
}

impl<A, F: NoUninit> OpaqueField<A, F> {
    /// Describe an aggregate-typed member as raw bytes. Always read-only.
    pub fn new(name: impl Into<String>, get: fn(&A) -> &F) -> Self {
        let mut meta = FieldMeta::new(name);
        meta.read_only = true;
        let size = std::mem::size_of::<F>();
        tracing::warn!(
            field = %meta.name,
            member_type = std::any::type_name::<F>(),
            size,
            "aggregate-typed field exposed as opaque bytes; element structure is not available"
        );
        Self {
            meta,
            shape: [size],
            get,
        }
    }

    /// Attach a documentation string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.meta.doc = Some(doc.into());
        self
    }

    /// Name, doc and writability.
    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Size of the member in bytes.
    pub fn size(&self) -> usize {
        self.shape[0]
    }

    /// The member's bytes, aliasing the aggregate.
    pub fn bytes<'a>(&self, aggregate: &'a A) -> &'a [u8] {
        bytemuck::bytes_of((self.get)(aggregate))
    }

    /// The member's bytes as a one-dimensional `uint8` view.
    pub fn view<'a>(&'a self, aggregate: &'a A) -> ArrayView<'a, u8> {
        ArrayView::new(&self.meta.name, self.bytes(aggregate), &self.shape)
    }
}

impl<A, F> std::fmt::Debug for OpaqueField<A, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpaqueField")
            .field("meta", &self.meta)
            .field("size", &self.shape[0])
            .finish()
    }
}

// ── Macros ──────────────────────────────────────────────────────────

/// Build a [`ScalarField`] for `$ty.$member`, named after the member.
///
/// ```
/// use simbind_core::scalar_field;
///
/// struct Outputs { reward: f64 }
///
/// let field = scalar_field!(Outputs, reward);
/// let mut out = Outputs { reward: 0.5 };
/// field.set(&mut out, 2.0).unwrap();
/// assert_eq!(field.get(&out), 2.0);
/// ```
#[macro_export]
macro_rules! scalar_field {
    ($ty:ty, $member:ident) => {
        $crate::ScalarField::new(
            stringify!($member),
            |a: &$ty| &a.$member,
            |a: &mut $ty| &mut a.$member,
        )
    };
}

/// Build an [`ArrayField`] for `$ty.$member`, named after the member.
///
/// Evaluates to a `Result`, like [`ArrayField::new`].
#[macro_export]
macro_rules! array_field {
    ($ty:ty, $member:ident) => {
        $crate::ArrayField::new(
            stringify!($member),
            |a: &$ty| &a.$member,
            |a: &mut $ty| &mut a.$member,
        )
    };
}

/// Build an [`OpaqueField`] for `$ty.$member`, named after the member.
#[macro_export]
macro_rules! opaque_field {
    ($ty:ty, $member:ident) => {
        $crate::OpaqueField::new(stringify!($member), |a: &$ty| &a.$member)
    };
}
