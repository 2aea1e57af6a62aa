//! Numeric element types and the native cast between them.
//!
//! Model structs generated from block diagrams only ever carry the ten
//! fixed-width numeric types listed in [`DType`]. [`Element`] is sealed to
//! exactly those Rust primitives so that every element type has a dtype
//! tag, a stable byte layout (`Pod`) and an `as` conversion to every other
//! element type.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use bytemuck::Pod;

/// Element type tag, named after the NumPy dtype it corresponds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    /// `u8` / `uint8`.
    U8,
    /// `i8` / `int8`.
    I8,
    /// `u16` / `uint16`.
    U16,
    /// `i16` / `int16`.
    I16,
    /// `u32` / `uint32`.
    U32,
    /// `i32` / `int32`.
    I32,
    /// `u64` / `uint64`.
    U64,
    /// `i64` / `int64`.
    I64,
    /// `f32` / `float32`.
    F32,
    /// `f64` / `float64`.
    F64,
}

impl DType {
    /// All element types, in declaration order.
    pub const ALL: [DType; 10] = [
        DType::U8,
        DType::I8,
        DType::U16,
        DType::I16,
        DType::U32,
        DType::I32,
        DType::U64,
        DType::I64,
        DType::F32,
        DType::F64,
    ];

    /// NumPy dtype name (`"uint8"`, ..., `"float64"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::I8 => "int8",
            Self::U16 => "uint16",
            Self::I16 => "int16",
            Self::U32 => "uint32",
            Self::I32 => "int32",
            Self::U64 => "uint64",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }

    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Returns `true` for `float32` and `float64`.
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns `true` for the eight integer types.
    pub fn is_integer(self) -> bool {
        !self.is_float()
    }

    /// Returns `true` for the signed integer and float types.
    pub fn is_signed(self) -> bool {
        !matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown dtype name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDTypeError {
    /// The name that did not match any dtype.
    pub name: String,
}

impl fmt::Display for ParseDTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown dtype '{}'", self.name)
    }
}

impl Error for ParseDTypeError {}

impl FromStr for DType {
    type Err = ParseDTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| ParseDTypeError {
                name: s.to_string(),
            })
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A numeric element type that can live in a model field or a space.
///
/// Implemented for `u8`, `i8`, `u16`, `i16`, `u32`, `i32`, `u64`, `i64`,
/// `f32` and `f64` only.
///
/// [`cast`](Element::cast) is Rust's `as` operator between any two element
/// types: integer narrowing keeps the low bits, float to integer truncates
/// toward zero (saturating at the target range, NaN becomes 0), integer to
/// float rounds to nearest. There is no overflow checking.
pub trait Element:
    Pod + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + sealed::Sealed
{
    /// The dtype tag of this type.
    const DTYPE: DType;

    /// Convert `self` to another element type with `as` semantics.
    fn cast<T: Element>(self) -> T;

    #[doc(hidden)]
    fn from_u8(v: u8) -> Self;
    #[doc(hidden)]
    fn from_i8(v: i8) -> Self;
    #[doc(hidden)]
    fn from_u16(v: u16) -> Self;
    #[doc(hidden)]
    fn from_i16(v: i16) -> Self;
    #[doc(hidden)]
    fn from_u32(v: u32) -> Self;
    #[doc(hidden)]
    fn from_i32(v: i32) -> Self;
    #[doc(hidden)]
    fn from_u64(v: u64) -> Self;
    #[doc(hidden)]
    fn from_i64(v: i64) -> Self;
    #[doc(hidden)]
    fn from_f32(v: f32) -> Self;
    #[doc(hidden)]
    fn from_f64(v: f64) -> Self;
}

macro_rules! cast_fns {
    ($t:ty) => {
        fn from_u8(v: u8) -> Self {
            v as $t
        }
        fn from_i8(v: i8) -> Self {
            v as $t
        }
        fn from_u16(v: u16) -> Self {
            v as $t
        }
        fn from_i16(v: i16) -> Self {
            v as $t
        }
        fn from_u32(v: u32) -> Self {
            v as $t
        }
        fn from_i32(v: i32) -> Self {
            v as $t
        }
        fn from_u64(v: u64) -> Self {
            v as $t
        }
        fn from_i64(v: i64) -> Self {
            v as $t
        }
        fn from_f32(v: f32) -> Self {
            v as $t
        }
        fn from_f64(v: f64) -> Self {
            v as $t
        }
    };
}

macro_rules! impl_element {
    ($($t:ty => $dtype:ident, $from:ident;)*) => {
        $(
            impl sealed::Sealed for $t {}

            #[allow(clippy::unnecessary_cast)]
            impl Element for $t {
                const DTYPE: DType = DType::$dtype;

                #[inline]
                fn cast<T: Element>(self) -> T {
                    T::$from(self)
                }

                cast_fns!($t);
            }
        )*
    };
}

impl_element! {
    u8 => U8, from_u8;
    i8 => I8, from_i8;
    u16 => U16, from_u16;
    i16 => I16, from_i16;
    u32 => U32, from_u32;
    i32 => I32, from_i32;
    u64 => U64, from_u64;
    i64 => I64, from_i64;
    f32 => F32, from_f32;
    f64 => F64, from_f64;
}
