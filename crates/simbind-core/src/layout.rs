//! Per-aggregate field table with name-based, dtype-erased access.
//!
//! An [`AggregateLayout`] is assembled once at bind time from typed
//! descriptors and then serves a dynamically-typed host: values cross it as
//! [`ScalarValue`] and [`ElementSlice`], and fields are looked up by name in
//! declaration order.

use bytemuck::NoUninit;
use indexmap::IndexMap;

use crate::dtype::{DType, Element};
use crate::error::FieldError;
use crate::field::{ArrayField, FieldMeta, OpaqueField, ScalarField};
use crate::shape::{FixedShape, Shape};
use crate::value::{ElementSlice, ElementSliceMut, ScalarValue};

/// The structural kind of a bound field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// One numeric value, accessed by copy.
    Scalar,
    /// A fixed-size array, accessed through views.
    Array {
        /// Per-dimension extents, outermost first.
        shape: Shape,
    },
    /// An aggregate-typed member exposed as raw bytes.
    Opaque {
        /// Size in bytes.
        size: usize,
    },
}

impl FieldKind {
    /// Lower-case kind name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Array { .. } => "array",
            Self::Opaque { .. } => "opaque",
        }
    }
}

/// Metadata about one bound field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo<'a> {
    /// Member name.
    pub name: &'a str,
    /// Documentation string, if any.
    pub doc: Option<&'a str>,
    /// Element type; `None` for opaque fields.
    pub dtype: Option<DType>,
    /// Structural kind.
    pub kind: FieldKind,
    /// Whether writes are rejected.
    pub read_only: bool,
}

trait ScalarAccess<A>: Send + Sync {
    fn meta(&self) -> &FieldMeta;
    fn dtype(&self) -> DType;
    fn get(&self, aggregate: &A) -> ScalarValue;
    fn set(&self, aggregate: &mut A, value: ScalarValue) -> Result<(), FieldError>;
}

impl<A, T: Element> ScalarAccess<A> for ScalarField<A, T> {
    fn meta(&self) -> &FieldMeta {
        ScalarField::meta(self)
    }

    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn get(&self, aggregate: &A) -> ScalarValue {
        ScalarValue::of(ScalarField::get(self, aggregate))
    }

    fn set(&self, aggregate: &mut A, value: ScalarValue) -> Result<(), FieldError> {
        self.set_dyn(aggregate, value)
    }
}

trait ArrayAccess<A>: Send + Sync {
    fn meta(&self) -> &FieldMeta;
    fn dtype(&self) -> DType;
    fn shape(&self) -> &[usize];
    fn elements<'a>(&self, aggregate: &'a A) -> ElementSlice<'a>;
    fn elements_mut<'a>(&self, aggregate: &'a mut A) -> Result<ElementSliceMut<'a>, FieldError>;
    fn write(&self, aggregate: &mut A, src: ElementSlice<'_>) -> Result<(), FieldError>;
}

impl<A, F: FixedShape> ArrayAccess<A> for ArrayField<A, F> {
    fn meta(&self) -> &FieldMeta {
        ArrayField::meta(self)
    }

    fn dtype(&self) -> DType {
        ArrayField::dtype(self)
    }

    fn shape(&self) -> &[usize] {
        ArrayField::shape(self)
    }

    fn elements<'a>(&self, aggregate: &'a A) -> ElementSlice<'a> {
        ElementSlice::of(ArrayField::elements(self, aggregate))
    }

    fn elements_mut<'a>(&self, aggregate: &'a mut A) -> Result<ElementSliceMut<'a>, FieldError> {
        ArrayField::elements_mut(self, aggregate).map(ElementSliceMut::of)
    }

    fn write(&self, aggregate: &mut A, src: ElementSlice<'_>) -> Result<(), FieldError> {
        self.write_dyn(aggregate, src)
    }
}

trait OpaqueAccess<A>: Send + Sync {
    fn meta(&self) -> &FieldMeta;
    fn bytes<'a>(&self, aggregate: &'a A) -> &'a [u8];
    fn size(&self) -> usize;
}

impl<A, F: NoUninit> OpaqueAccess<A> for OpaqueField<A, F> {
    fn meta(&self) -> &FieldMeta {
        OpaqueField::meta(self)
    }

    fn bytes<'a>(&self, aggregate: &'a A) -> &'a [u8] {
        OpaqueField::bytes(self, aggregate)
    }

    fn size(&self) -> usize {
        OpaqueField::size(self)
    }
}

enum FieldBinding<A> {
    Scalar(Box<dyn ScalarAccess<A>>),
    Array(Box<dyn ArrayAccess<A>>),
    Opaque(Box<dyn OpaqueAccess<A>>),
}

impl<A> FieldBinding<A> {
    fn meta(&self) -> &FieldMeta {
        match self {
            Self::Scalar(f) => f.meta(),
            Self::Array(f) => f.meta(),
            Self::Opaque(f) => f.meta(),
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            Self::Scalar(_) => FieldKind::Scalar,
            Self::Array(f) => FieldKind::Array {
                shape: Shape::from_slice(f.shape()),
            },
            Self::Opaque(f) => FieldKind::Opaque { size: f.size() },
        }
    }

    fn info(&self) -> FieldInfo<'_> {
        let meta = self.meta();
        FieldInfo {
            name: &meta.name,
            doc: meta.doc.as_deref(),
            dtype: match self {
                Self::Scalar(f) => Some(f.dtype()),
                Self::Array(f) => Some(f.dtype()),
                Self::Opaque(_) => None,
            },
            kind: self.kind(),
            read_only: meta.read_only,
        }
    }
}

/// All field descriptors of one aggregate type, keyed by name.
///
/// Built with the `with_*` methods, which reject duplicate names. Fields
/// keep their declaration order.
///
/// # Examples
///
/// ```
/// use simbind_core::{array_field, scalar_field, AggregateLayout, ElementSlice, ScalarValue};
///
/// struct Outputs {
///     reward: f64,
///     obs: [[f32; 2]; 2],
/// }
///
/// let layout = AggregateLayout::new()
///     .with_scalar(scalar_field!(Outputs, reward))?
///     .with_array(array_field!(Outputs, obs)?)?;
///
/// let mut out = Outputs { reward: 0.0, obs: [[0.0; 2]; 2] };
/// layout.set_scalar(&mut out, "reward", ScalarValue::I32(3))?;
/// layout.write_array(&mut out, "obs", ElementSlice::of(&[1.0f64, 2.0, 3.0, 4.0]))?;
///
/// assert_eq!(out.reward, 3.0);
/// assert_eq!(out.obs, [[1.0, 2.0], [3.0, 4.0]]);
/// # Ok::<(), simbind_core::FieldError>(())
/// ```
pub struct AggregateLayout<A: 'static> {
    fields: IndexMap<String, FieldBinding<A>>,
}

impl<A: 'static> Default for AggregateLayout<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> AggregateLayout<A> {
    /// An empty layout.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    fn bind(mut self, binding: FieldBinding<A>) -> Result<Self, FieldError> {
        let name = binding.meta().name.clone();
        if self.fields.contains_key(&name) {
            return Err(FieldError::DuplicateField { name });
        }
        tracing::debug!(
            aggregate = std::any::type_name::<A>(),
            field = %name,
            kind = binding.kind().name(),
            read_only = binding.meta().read_only,
            "bound field"
        );
        self.fields.insert(name, binding);
        Ok(self)
    }

    /// Add a scalar field.
    pub fn with_scalar<T: Element>(self, field: ScalarField<A, T>) -> Result<Self, FieldError> {
        self.bind(FieldBinding::Scalar(Box::new(field)))
    }

    /// Add an array field.
    pub fn with_array<F: FixedShape>(self, field: ArrayField<A, F>) -> Result<Self, FieldError> {
        self.bind(FieldBinding::Array(Box::new(field)))
    }

    /// Add an opaque field.
    pub fn with_opaque<F: NoUninit>(self, field: OpaqueField<A, F>) -> Result<Self, FieldError> {
        self.bind(FieldBinding::Opaque(Box::new(field)))
    }

    /// Number of bound fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is bound.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` if a field with this name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Metadata for every field, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = FieldInfo<'_>> + '_ {
        self.fields.values().map(FieldBinding::info)
    }

    /// Metadata for one field.
    pub fn info(&self, name: &str) -> Result<FieldInfo<'_>, FieldError> {
        self.lookup(name).map(FieldBinding::info)
    }

    /// Current value of a scalar field.
    pub fn get_scalar(&self, aggregate: &A, name: &str) -> Result<ScalarValue, FieldError> {
        Ok(self.scalar(name)?.get(aggregate))
    }

    /// Overwrite a scalar field, converting `value` to the field's type.
    pub fn set_scalar(
        &self,
        aggregate: &mut A,
        name: &str,
        value: impl Into<ScalarValue>,
    ) -> Result<(), FieldError> {
        self.scalar(name)?.set(aggregate, value.into())
    }

    /// The elements of an array field, aliasing the aggregate.
    pub fn array<'a>(&self, aggregate: &'a A, name: &str) -> Result<ElementSlice<'a>, FieldError> {
        Ok(self.array_binding(name)?.elements(aggregate))
    }

    /// The elements of a writable array field, mutably aliasing the
    /// aggregate.
    pub fn array_mut<'a>(
        &self,
        aggregate: &'a mut A,
        name: &str,
    ) -> Result<ElementSliceMut<'a>, FieldError> {
        self.array_binding(name)?.elements_mut(aggregate)
    }

    /// Overwrite an array field from a buffer of any element type.
    ///
    /// Fails with [`FieldError::ReadOnlyViolation`] or
    /// [`FieldError::ShapeMismatch`] without writing anything.
    pub fn write_array(
        &self,
        aggregate: &mut A,
        name: &str,
        src: ElementSlice<'_>,
    ) -> Result<(), FieldError> {
        self.array_binding(name)?.write(aggregate, src)
    }

    /// The bytes of an opaque field.
    pub fn raw_bytes<'a>(&self, aggregate: &'a A, name: &str) -> Result<&'a [u8], FieldError> {
        match self.lookup(name)? {
            FieldBinding::Opaque(f) => Ok(f.bytes(aggregate)),
            other => Err(kind_mismatch(other, "opaque")),
        }
    }

    fn lookup(&self, name: &str) -> Result<&FieldBinding<A>, FieldError> {
        self.fields
            .get(name)
            .ok_or_else(|| FieldError::UnknownField {
                name: name.to_string(),
            })
    }

    fn scalar(&self, name: &str) -> Result<&dyn ScalarAccess<A>, FieldError> {
        match self.lookup(name)? {
            FieldBinding::Scalar(f) => Ok(&**f),
            other => Err(kind_mismatch(other, "scalar")),
        }
    }

    fn array_binding(&self, name: &str) -> Result<&dyn ArrayAccess<A>, FieldError> {
        match self.lookup(name)? {
            FieldBinding::Array(f) => Ok(&**f),
            other => Err(kind_mismatch(other, "array")),
        }
    }
}

fn kind_mismatch<A>(binding: &FieldBinding<A>, expected: &'static str) -> FieldError {
    FieldError::KindMismatch {
        field: binding.meta().name.clone(),
        expected,
        actual: binding.kind().name(),
    }
}

impl<A: 'static> std::fmt::Debug for AggregateLayout<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.fields()).finish()
    }
}
