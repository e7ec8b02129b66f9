//! In-memory values of data elements.
//!
//! A [`Value`] is a tagged variant holding integers, floats, text or raw bytes.
//! Values assigned through the high-level API are converted
//! to the kind expected by the element's value representation
//! with [`Value::convert_for`].
use crate::header::{Tag, ValueKind, VR};
use itertools::Itertools;
use smallvec::SmallVec;
use snafu::{OptionExt, Snafu};
use std::borrow::Cow;
use std::fmt;

/// An aggregation of one or more elements in a value.
pub type C<T> = SmallVec<[T; 2]>;

/// An error raised when a value cannot be converted to the requested form.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum ConvertValueError {
    /// The value is of a kind which cannot be turned into the requested one.
    #[snafu(display("cannot convert {} value to {}", original, requested))]
    Incompatible {
        original: &'static str,
        requested: &'static str,
    },
    /// A piece of text could not be parsed as a number.
    #[snafu(display("cannot parse `{}` as {}", text, requested))]
    ParseNumber {
        text: String,
        requested: &'static str,
    },
    /// The number does not fit in the target integer type.
    #[snafu(display("number {} is out of range", value))]
    OutOfRange { value: i64 },
    /// The value has no elements.
    #[snafu(display("value is empty"))]
    EmptyValue,
}

/// The value of a DICOM data element.
///
/// Multiple values of the same kind are packed together:
/// numbers in a small vector, text as a single backslash-separated string.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Empty,
    /// One or more integers.
    Integers(C<i64>),
    /// One or more floating point numbers.
    Floats(C<f64>),
    /// Text, possibly containing multiple backslash-separated values.
    Text(String),
    /// Uninterpreted bytes.
    Bytes(Vec<u8>),
}

impl Value {
    /// Create an empty value.
    pub fn empty() -> Self {
        Value::Empty
    }

    /// The name of the value's kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Integers(_) => "integer",
            Value::Floats(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Whether the value holds nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Integers(v) => v.is_empty(),
            Value::Floats(v) => v.is_empty(),
            Value::Text(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
        }
    }

    /// The number of individual values.
    pub fn multiplicity(&self) -> usize {
        match self {
            Value::Empty => 0,
            Value::Integers(v) => v.len(),
            Value::Floats(v) => v.len(),
            Value::Text(s) if s.is_empty() => 0,
            Value::Text(s) => s.split('\\').count(),
            Value::Bytes(_) => 1,
        }
    }

    /// Get the integers, if the value holds integers.
    pub fn integers(&self) -> Option<&[i64]> {
        match self {
            Value::Integers(v) => Some(v),
            _ => None,
        }
    }

    /// Get the floats, if the value holds floats.
    pub fn floats(&self) -> Option<&[f64]> {
        match self {
            Value::Floats(v) => Some(v),
            _ => None,
        }
    }

    /// Get the raw bytes, if the value holds bytes.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Retrieve the value as text.
    ///
    /// Numbers are joined with backslashes, bytes are interpreted
    /// as (lossy) UTF-8 with trailing padding removed.
    pub fn to_str(&self) -> Cow<'_, str> {
        match self {
            Value::Empty => Cow::Borrowed(""),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Integers(v) => Cow::Owned(v.iter().join("\\")),
            Value::Floats(v) => Cow::Owned(v.iter().join("\\")),
            Value::Bytes(b) => match String::from_utf8_lossy(b) {
                Cow::Borrowed(s) => Cow::Borrowed(s.trim_end_matches(is_padding)),
                Cow::Owned(s) => Cow::Owned(s.trim_end_matches(is_padding).to_string()),
            },
        }
    }

    /// Retrieve all values as integers, parsing text if needed.
    pub fn to_multi_int(&self) -> Result<C<i64>, ConvertValueError> {
        match self {
            Value::Empty => Ok(C::new()),
            Value::Integers(v) => Ok(v.clone()),
            Value::Floats(v) => Ok(v.iter().map(|f| *f as i64).collect()),
            Value::Text(s) => s
                .split('\\')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<i64>().or_else(|_| {
                        s.parse::<f64>()
                            .map(|f| f as i64)
                            .map_err(|_| ConvertValueError::ParseNumber {
                                text: s.to_string(),
                                requested: "integer",
                            })
                    })
                })
                .collect(),
            Value::Bytes(b) => Ok(b.iter().map(|b| i64::from(*b)).collect()),
        }
    }

    /// Retrieve all values as floats, parsing text if needed.
    pub fn to_multi_float(&self) -> Result<C<f64>, ConvertValueError> {
        match self {
            Value::Empty => Ok(C::new()),
            Value::Integers(v) => Ok(v.iter().map(|i| *i as f64).collect()),
            Value::Floats(v) => Ok(v.clone()),
            Value::Text(s) => s
                .split('\\')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<f64>()
                        .map_err(|_| ConvertValueError::ParseNumber {
                            text: s.to_string(),
                            requested: "float",
                        })
                })
                .collect(),
            Value::Bytes(_) => IncompatibleSnafu {
                original: "bytes",
                requested: "float",
            }
            .fail(),
        }
    }

    /// Retrieve the first value as an integer of the requested type.
    pub fn to_int<T>(&self) -> Result<T, ConvertValueError>
    where
        T: TryFrom<i64>,
    {
        let first = *self.to_multi_int()?.first().context(EmptyValueSnafu)?;
        T::try_from(first).map_err(|_| ConvertValueError::OutOfRange { value: first })
    }

    /// Retrieve the first value as a double precision float.
    pub fn to_float(&self) -> Result<f64, ConvertValueError> {
        self.to_multi_float()?
            .first()
            .copied()
            .context(EmptyValueSnafu)
    }

    /// Retrieve the value as an attribute tag, from its `GGGG,EEEE` text form.
    pub fn to_tag(&self) -> Result<Tag, ConvertValueError> {
        let text = self.to_str();
        let first = text.split('\\').next().unwrap_or_default().trim();
        first.parse().map_err(|_| ConvertValueError::ParseNumber {
            text: first.to_string(),
            requested: "tag",
        })
    }

    /// Convert the value into the kind expected by the given value representation.
    ///
    /// ```
    /// # use dcm_core::{Value, VR};
    /// let v = Value::from("12\\13").convert_for(VR::US)?;
    /// assert_eq!(v.integers(), Some(&[12, 13][..]));
    ///
    /// let v = Value::from(1.5).convert_for(VR::LO)?;
    /// assert_eq!(v, Value::from("1.5"));
    /// # Ok::<(), dcm_core::value::ConvertValueError>(())
    /// ```
    pub fn convert_for(self, vr: VR) -> Result<Value, ConvertValueError> {
        match self {
            Value::Empty => return Ok(Value::Empty),
            // raw bytes are kept as is for the "other" binary VRs
            Value::Bytes(mut b) if matches!(vr, VR::OB | VR::OW | VR::OL | VR::OF | VR::OD) => {
                if b.len() % 2 == 1 {
                    b.push(0);
                }
                return Ok(Value::Bytes(b));
            }
            _ => {}
        }
        match vr.value_kind() {
            ValueKind::Integer => match self {
                Value::Bytes(b) => Ok(Value::Integers(b.into_iter().map(i64::from).collect())),
                v @ Value::Integers(_) => Ok(v),
                v => Ok(Value::Integers(v.to_multi_int()?)),
            },
            ValueKind::Float => match self {
                v @ Value::Floats(_) => Ok(v),
                v => Ok(Value::Floats(v.to_multi_float()?)),
            },
            ValueKind::Text => match self {
                v @ Value::Text(_) => Ok(v),
                v => Ok(Value::Text(v.to_str().into_owned())),
            },
            ValueKind::Bytes => match self {
                v @ Value::Bytes(_) => Ok(v),
                Value::Text(s) => Ok(Value::Bytes(s.into_bytes())),
                Value::Integers(v) => Ok(Value::Bytes(
                    v.into_iter()
                        .map(|i| u8::try_from(i).map_err(|_| ConvertValueError::OutOfRange { value: i }))
                        .collect::<Result<_, _>>()?,
                )),
                v => IncompatibleSnafu {
                    original: v.kind_name(),
                    requested: "bytes",
                }
                .fail(),
            },
        }
    }
}

fn is_padding(c: char) -> bool {
    c == '\0' || c == ' '
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bytes(b) => write!(f, "[{} bytes]", b.len()),
            v => f.write_str(&v.to_str()),
        }
    }
}

macro_rules! impl_from_int {
    ($($t: ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Integers(smallvec::smallvec![i64::from(value)])
                }
            }

            impl From<Vec<$t>> for Value {
                fn from(value: Vec<$t>) -> Self {
                    Value::Integers(value.into_iter().map(i64::from).collect())
                }
            }
        )*
    };
}

impl_from_int!(u16, i16, u32, i32, i64);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Floats(smallvec::smallvec![value])
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Floats(smallvec::smallvec![f64::from(value)])
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::Floats(value.into_iter().collect())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Tag> for Value {
    fn from(value: Tag) -> Self {
        Value::Text(value.to_string())
    }
}
