//! Core types for simbind: element types, field descriptors and views.
//!
//! A simulation model is compiled to a native struct (the *aggregate*). This
//! crate describes that struct's members once, at bind time, and then gives
//! a host access to them:
//!
//! - scalar members through [`ScalarField`], by copy,
//! - fixed-size array members through [`ArrayField`], as [`ArrayView`] /
//!   [`ArrayViewMut`] borrows that alias the aggregate's storage,
//! - aggregate-typed members through [`OpaqueField`], as raw bytes.
//!
//! Writes from a buffer of a different element type go through
//! [`copy_with_coercion`], which converts with Rust's `as`.
//! [`AggregateLayout`] collects the descriptors of one aggregate type for
//! name-based, dtype-erased access.
//!
//! Nothing here synchronizes access to the aggregate. Views borrow it, so
//! the borrow checker rules out outliving it within Rust; a host that keeps
//! views across calls must keep the aggregate alive itself.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod copy;
pub mod dtype;
pub mod error;
pub mod field;
pub mod layout;
pub mod shape;
pub mod value;
pub mod view;

pub use copy::copy_with_coercion;
pub use dtype::{DType, Element, ParseDTypeError};
pub use error::FieldError;
pub use field::{ArrayField, FieldMeta, OpaqueField, ScalarField};
pub use layout::{AggregateLayout, FieldInfo, FieldKind};
pub use shape::{element_count, flat_index, FixedShape, Shape};
pub use value::{ElementBuffer, ElementSlice, ElementSliceMut, ScalarValue};
pub use view::{ArrayView, ArrayViewMut};
