//! JSON configuration for action and observation spaces.
//!
//! A model's environment declares one action space and one observation
//! space. Each is an object tagged by `"type"`:
//!
//! ```json
//! {
//!   "action_space": { "type": "Discrete", "n": 4 },
//!   "observation_space": {
//!     "type": "Box", "low": "-inf", "high": [1, 2.5], "shape": [2], "dtype": "float32"
//!   }
//! }
//! ```
//!
//! Box bounds are a single number (broadcast to every element) or a list
//! with one number per element. Numbers may be integers, floats, or the
//! strings `"inf"` / `"-inf"` for float dtypes.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use simbind_core::{DType, Element, ParseDTypeError};

use crate::boxed::{AnyBox, Bound, BoxSpace};
use crate::discrete::Discrete;
use crate::error::SpaceError;
use crate::multi_binary::MultiBinary;
use crate::multi_discrete::MultiDiscrete;
use crate::space::Space;

// ── Errors ──────────────────────────────────────────────────────────

/// Errors from loading or building a space configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON could not be parsed.
    Parse(serde_json::Error),
    /// The configuration file could not be read or written.
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The `dtype` field names no supported element type.
    UnknownDtype(ParseDTypeError),
    /// A bound value cannot be represented in the box's dtype.
    InvalidBound {
        /// The box's element type.
        dtype: DType,
        /// The offending value as written.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The values are well-formed but do not describe a valid space.
    Space(SpaceError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid space config: {e}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::UnknownDtype(e) => write!(f, "{e}"),
            Self::InvalidBound {
                dtype,
                value,
                reason,
            } => write!(f, "bound {value} is not a valid {dtype}: {reason}"),
            Self::Space(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::UnknownDtype(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::InvalidBound { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<ParseDTypeError> for ConfigError {
    fn from(e: ParseDTypeError) -> Self {
        Self::UnknownDtype(e)
    }
}

// ── Numbers and bounds ──────────────────────────────────────────────

/// A non-finite float written as a string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Infinity {
    /// `"inf"`.
    #[serde(rename = "inf")]
    Positive,
    /// `"-inf"`.
    #[serde(rename = "-inf")]
    Negative,
}

/// A bound value as written in the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// An integer that fits in `i64`.
    Int(i64),
    /// An integer above `i64::MAX`.
    UInt(u64),
    /// A number with a fraction or exponent.
    Float(f64),
    /// `"inf"` or `"-inf"`.
    Infinite(Infinity),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Infinite(Infinity::Positive) => f.write_str("inf"),
            Self::Infinite(Infinity::Negative) => f.write_str("-inf"),
        }
    }
}

/// Inclusive integer range of an integer dtype.
fn int_range(dtype: DType) -> (i128, i128) {
    match dtype {
        DType::U8 => (0, u8::MAX.into()),
        DType::I8 => (i8::MIN.into(), i8::MAX.into()),
        DType::U16 => (0, u16::MAX.into()),
        DType::I16 => (i16::MIN.into(), i16::MAX.into()),
        DType::U32 => (0, u32::MAX.into()),
        DType::I32 => (i32::MIN.into(), i32::MAX.into()),
        DType::U64 => (0, u64::MAX.into()),
        DType::I64 | DType::F32 | DType::F64 => (i64::MIN.into(), i64::MAX.into()),
    }
}

impl Number {
    /// Convert to the element type `T`.
    ///
    /// Float dtypes accept every number, including the infinities. Integer
    /// dtypes accept only whole numbers within their range.
    pub fn to_element<T: Element>(self) -> Result<T, ConfigError> {
        let dtype = T::DTYPE;
        let invalid = |reason| ConfigError::InvalidBound {
            dtype,
            value: self.to_string(),
            reason,
        };
        if dtype.is_float() {
            return Ok(match self {
                Self::Int(v) => v.cast(),
                Self::UInt(v) => v.cast(),
                Self::Float(v) => v.cast(),
                Self::Infinite(Infinity::Positive) => f64::INFINITY.cast(),
                Self::Infinite(Infinity::Negative) => f64::NEG_INFINITY.cast(),
            });
        }
        let whole: i128 = match self {
            Self::Int(v) => v.into(),
            Self::UInt(v) => v.into(),
            Self::Float(v) if !v.is_finite() || v.fract() != 0.0 => {
                return Err(invalid("not a whole number"));
            }
            // Finite and whole; the range check below catches huge values.
            Self::Float(v) => v as i128,
            Self::Infinite(_) => return Err(invalid("infinity needs a float dtype")),
        };
        let (min, max) = int_range(dtype);
        if whole < min || whole > max {
            return Err(invalid("out of range"));
        }
        Ok(match self {
            Self::UInt(v) => v.cast(),
            _ => (whole as i64).cast(),
        })
    }
}

/// A box bound: one number for every element, or one number per element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundConfig {
    /// Broadcast to every element.
    Scalar(Number),
    /// One value per element, row-major.
    List(Vec<Number>),
}

impl BoundConfig {
    fn to_bound<T: Element>(&self) -> Result<Bound<T>, ConfigError> {
        Ok(match self {
            Self::Scalar(n) => Bound::Uniform(n.to_element()?),
            Self::List(values) => Bound::Each(
                values
                    .iter()
                    .map(|n| n.to_element())
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl From<f64> for BoundConfig {
    fn from(value: f64) -> Self {
        Self::Scalar(Number::Float(value))
    }
}

// ── Space config ────────────────────────────────────────────────────

fn default_dtype() -> String {
    DType::F64.name().to_string()
}

/// Declarative description of one space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpaceConfig {
    /// A [`BoxSpace`] of the named dtype.
    Box {
        /// Lower bound(s).
        low: BoundConfig,
        /// Upper bound(s).
        high: BoundConfig,
        /// Per-dimension extents.
        shape: Vec<usize>,
        /// NumPy dtype name; defaults to `float64`.
        #[serde(default = "default_dtype")]
        dtype: String,
    },
    /// A [`Discrete`] space.
    Discrete {
        /// Number of choices.
        n: u64,
    },
    /// A [`MultiDiscrete`] space.
    MultiDiscrete {
        /// Choices per dimension.
        nvec: Vec<u64>,
    },
    /// A [`MultiBinary`] space.
    MultiBinary {
        /// Number of flags.
        n: u64,
    },
}

/// `Box(0.0, 1.0, [2, 2], float64)`.
impl Default for SpaceConfig {
    fn default() -> Self {
        Self::Box {
            low: 0.0.into(),
            high: 1.0.into(),
            shape: vec![2, 2],
            dtype: default_dtype(),
        }
    }
}

fn build_box<T>(
    low: &BoundConfig,
    high: &BoundConfig,
    shape: &[usize],
) -> Result<AnyBox, ConfigError>
where
    T: Element,
    AnyBox: From<BoxSpace<T>>,
{
    let space = BoxSpace::<T>::new(low.to_bound()?, high.to_bound()?, shape)?;
    Ok(space.into())
}

impl SpaceConfig {
    /// Validate and build the described space.
    pub fn build(&self) -> Result<Space, ConfigError> {
        let space = match self {
            Self::Box {
                low,
                high,
                shape,
                dtype,
            } => {
                let dtype: DType = dtype.parse()?;
                let boxed = match dtype {
                    DType::U8 => build_box::<u8>(low, high, shape),
                    DType::I8 => build_box::<i8>(low, high, shape),
                    DType::U16 => build_box::<u16>(low, high, shape),
                    DType::I16 => build_box::<i16>(low, high, shape),
                    DType::U32 => build_box::<u32>(low, high, shape),
                    DType::I32 => build_box::<i32>(low, high, shape),
                    DType::U64 => build_box::<u64>(low, high, shape),
                    DType::I64 => build_box::<i64>(low, high, shape),
                    DType::F32 => build_box::<f32>(low, high, shape),
                    DType::F64 => build_box::<f64>(low, high, shape),
                }?;
                Space::Box(boxed)
            }
            Self::Discrete { n } => Discrete::new(*n).into(),
            Self::MultiDiscrete { nvec } => MultiDiscrete::new(nvec.clone()).into(),
            Self::MultiBinary { n } => MultiBinary::new(*n).into(),
        };
        tracing::debug!(space = %space, "built space from config");
        Ok(space)
    }
}

/// The action and observation spaces of one environment.
///
/// Either section may be omitted, in which case it takes
/// [`SpaceConfig::default`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacesConfig {
    /// Space of actions fed to the model.
    pub action_space: SpaceConfig,
    /// Space of observations produced by the model.
    pub observation_space: SpaceConfig,
}

impl SpacesConfig {
    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Write as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_json_string()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build both spaces, action space first.
    pub fn build(&self) -> Result<(Space, Space), ConfigError> {
        Ok((self.action_space.build()?, self.observation_space.build()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simbind_core::ElementSlice;

    use crate::space::{Sample, SpaceKind};

    #[test]
    fn default_is_unit_float64_box() {
        let space = SpaceConfig::default().build().unwrap();
        assert_eq!(space.kind(), SpaceKind::Box(DType::F64));
        assert_eq!(space.to_string(), "Box(0, 1, [2, 2])");
    }

    #[test]
    fn parses_every_kind() {
        let json = r#"{
            "action_space": {"type": "MultiDiscrete", "nvec": [2, 3]},
            "observation_space": {"type": "MultiBinary", "n": 4}
        }"#;
        let config = SpacesConfig::from_json_str(json).unwrap();
        let (action, observation) = config.build().unwrap();
        assert_eq!(action, Space::MultiDiscrete(MultiDiscrete::new([2, 3])));
        assert_eq!(observation, Space::MultiBinary(MultiBinary::new(4)));

        let discrete: SpaceConfig =
            serde_json::from_str(r#"{"type": "Discrete", "n": 5}"#).unwrap();
        assert_eq!(discrete.build().unwrap().to_string(), "Discrete(5)");
    }

    #[test]
    fn missing_sections_take_defaults() {
        let json = r#"{"action_space": {"type": "Discrete", "n": 2}}"#;
        let config = SpacesConfig::from_json_str(json).unwrap();
        assert_eq!(config.observation_space, SpaceConfig::default());
    }

    #[test]
    fn box_accepts_mixed_bounds_and_infinity() {
        let json = r#"{
            "type": "Box", "low": "-inf", "high": [1, 2.5], "shape": [2], "dtype": "float32"
        }"#;
        let space = serde_json::from_str::<SpaceConfig>(json).unwrap().build().unwrap();
        assert_eq!(space.kind(), SpaceKind::Box(DType::F32));
        assert!(space.contains(Sample::Elements {
            data: ElementSlice::of(&[-1e30f32, 2.5]),
            shape: &[2],
        }));
        assert!(!space.contains(Sample::Elements {
            data: ElementSlice::of(&[0.0f32, 2.6]),
            shape: &[2],
        }));
    }

    #[test]
    fn dtype_defaults_to_float64() {
        let json = r#"{"type": "Box", "low": 0, "high": 1, "shape": [3]}"#;
        let space = serde_json::from_str::<SpaceConfig>(json).unwrap().build().unwrap();
        assert_eq!(space.dtype(), DType::F64);
    }

    #[test]
    fn integer_box_rejects_fractions_and_overflow() {
        let fraction = SpaceConfig::Box {
            low: BoundConfig::Scalar(Number::Float(0.5)),
            high: BoundConfig::Scalar(Number::Int(1)),
            shape: vec![1],
            dtype: "int32".into(),
        };
        assert!(matches!(
            fraction.build(),
            Err(ConfigError::InvalidBound { dtype: DType::I32, .. })
        ));

        let overflow = SpaceConfig::Box {
            low: BoundConfig::Scalar(Number::Int(0)),
            high: BoundConfig::Scalar(Number::Int(256)),
            shape: vec![1],
            dtype: "uint8".into(),
        };
        assert!(matches!(overflow.build(), Err(ConfigError::InvalidBound { .. })));

        let negative = SpaceConfig::Box {
            low: BoundConfig::Scalar(Number::Int(-1)),
            high: BoundConfig::Scalar(Number::Int(1)),
            shape: vec![1],
            dtype: "uint64".into(),
        };
        assert!(matches!(negative.build(), Err(ConfigError::InvalidBound { .. })));

        let infinite = SpaceConfig::Box {
            low: BoundConfig::Scalar(Number::Infinite(Infinity::Negative)),
            high: BoundConfig::Scalar(Number::Int(1)),
            shape: vec![1],
            dtype: "int64".into(),
        };
        assert!(matches!(infinite.build(), Err(ConfigError::InvalidBound { .. })));
    }

    #[test]
    fn whole_floats_are_fine_for_integer_boxes() {
        let config = SpaceConfig::Box {
            low: BoundConfig::Scalar(Number::Float(-3.0)),
            high: BoundConfig::List(vec![Number::Float(3.0), Number::Int(4)]),
            shape: vec![2],
            dtype: "int8".into(),
        };
        let space = config.build().unwrap();
        assert_eq!(space.to_string(), "Box(-3, 4, [2])");
    }

    #[test]
    fn u64_max_fits_uint64() {
        let json = format!(
            r#"{{"type": "Box", "low": 0, "high": {}, "shape": [1], "dtype": "uint64"}}"#,
            u64::MAX
        );
        let space = serde_json::from_str::<SpaceConfig>(&json).unwrap().build().unwrap();
        assert_eq!(space.to_string(), format!("Box(0, {}, [1])", u64::MAX));
    }

    #[test]
    fn unknown_dtype_is_reported() {
        let config = SpaceConfig::Box {
            low: 0.0.into(),
            high: 1.0.into(),
            shape: vec![1],
            dtype: "complex128".into(),
        };
        let err = config.build().unwrap_err();
        assert_eq!(err.to_string(), "unknown dtype 'complex128'");
    }

    #[test]
    fn bound_length_mismatch_is_a_space_error() {
        let config = SpaceConfig::Box {
            low: BoundConfig::List(vec![Number::Int(0); 2]),
            high: 1.0.into(),
            shape: vec![3],
            dtype: "float64".into(),
        };
        assert!(matches!(
            config.build(),
            Err(ConfigError::Space(SpaceError::ShapeMismatch { what: "low", .. }))
        ));
    }

    #[test]
    fn json_round_trips() {
        let config = SpacesConfig {
            action_space: SpaceConfig::Discrete { n: 3 },
            observation_space: SpaceConfig::Box {
                low: BoundConfig::Scalar(Number::Infinite(Infinity::Negative)),
                high: BoundConfig::List(vec![Number::Float(0.5), Number::Int(2)]),
                shape: vec![2],
                dtype: "float32".into(),
            },
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(SpacesConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SpacesConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SpacesConfig::from_json_str(r#"{"action_space": {"type": "Tuple"}}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SpacesConfig::load("/nonexistent/spaces.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
