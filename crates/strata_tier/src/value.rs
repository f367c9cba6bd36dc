// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use jiff::Timestamp;

use crate::{Error, Kind, Result};

/// A cached value together with its kind.
///
/// Values convert from the matching Rust types with [`From`] and back with
/// [`TryFrom`]:
///
/// ```
/// use strata_tier::{Kind, Value};
///
/// let value = Value::from(42_u16);
/// assert_eq!(value.kind(), Kind::U16);
/// assert_eq!(u16::try_from(value).unwrap(), 42);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// An 8-bit signed integer.
    I8(i8),
    /// A 16-bit signed integer.
    I16(i16),
    /// A 32-bit signed integer.
    I32(i32),
    /// A 64-bit signed integer.
    I64(i64),
    /// An 8-bit unsigned integer.
    U8(u8),
    /// A 16-bit unsigned integer.
    U16(u16),
    /// A 32-bit unsigned integer.
    U32(u32),
    /// A 64-bit unsigned integer.
    U64(u64),
    /// A 32-bit float.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// UTF-8 text.
    String(String),
    /// A span of time.
    Duration(Duration),
    /// An instant in time.
    Timestamp(Timestamp),
    /// An opaque byte sequence.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns the kind of the value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::I8(_) => Kind::I8,
            Self::I16(_) => Kind::I16,
            Self::I32(_) => Kind::I32,
            Self::I64(_) => Kind::I64,
            Self::U8(_) => Kind::U8,
            Self::U16(_) => Kind::U16,
            Self::U32(_) => Kind::U32,
            Self::U64(_) => Kind::U64,
            Self::F32(_) => Kind::F32,
            Self::F64(_) => Kind::F64,
            Self::String(_) => Kind::String,
            Self::Duration(_) => Kind::Duration,
            Self::Timestamp(_) => Kind::Timestamp,
            Self::Bytes(_) => Kind::Bytes,
        }
    }

    /// Returns the text payload of a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the payload of a [`Value::Bytes`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Interprets the value as a 64-bit signed integer.
    ///
    /// Integers widen losslessly, floats truncate toward zero and strings are
    /// parsed as decimal integers.
    ///
    /// # Errors
    ///
    /// Returns a conversion error for non-numeric values and for numbers outside
    /// the `i64` range.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Self::I8(v) => Ok(i64::from(*v)),
            Self::I16(v) => Ok(i64::from(*v)),
            Self::I32(v) => Ok(i64::from(*v)),
            Self::I64(v) => Ok(*v),
            Self::U8(v) => Ok(i64::from(*v)),
            Self::U16(v) => Ok(i64::from(*v)),
            Self::U32(v) => Ok(i64::from(*v)),
            Self::U64(v) => i64::try_from(*v).map_err(Error::conversion),
            Self::F32(v) => truncate(f64::from(*v)),
            Self::F64(v) => truncate(*v),
            Self::String(text) => text.trim().parse::<i64>().map_err(Error::conversion),
            Self::Bool(_) | Self::Duration(_) | Self::Timestamp(_) | Self::Bytes(_) => Err(not_numeric(self.kind())),
        }
    }

    /// Adds `delta` to a numeric value without changing its kind.
    ///
    /// Strings holding a decimal integer are treated as numbers and stay strings.
    ///
    /// # Errors
    ///
    /// Returns a conversion error when the value is not numeric or the result
    /// does not fit the value's kind.
    pub fn checked_add(&self, delta: i64) -> Result<Self> {
        macro_rules! narrow {
            ($variant:ident, $ty:ty, $v:expr) => {
                i64::from($v)
                    .checked_add(delta)
                    .and_then(|sum| <$ty>::try_from(sum).ok())
                    .map(Self::$variant)
                    .ok_or_else(|| overflow(self.kind(), delta))
            };
        }

        match self {
            Self::I8(v) => narrow!(I8, i8, *v),
            Self::I16(v) => narrow!(I16, i16, *v),
            Self::I32(v) => narrow!(I32, i32, *v),
            Self::U8(v) => narrow!(U8, u8, *v),
            Self::U16(v) => narrow!(U16, u16, *v),
            Self::U32(v) => narrow!(U32, u32, *v),
            Self::I64(v) => v.checked_add(delta).map(Self::I64).ok_or_else(|| overflow(Kind::I64, delta)),
            Self::U64(v) => v
                .checked_add_signed(delta)
                .map(Self::U64)
                .ok_or_else(|| overflow(Kind::U64, delta)),
            #[expect(clippy::cast_precision_loss, reason = "float counters accept rounding of large deltas")]
            Self::F32(v) => Ok(Self::F32(v + delta as f32)),
            #[expect(clippy::cast_precision_loss, reason = "float counters accept rounding of large deltas")]
            Self::F64(v) => Ok(Self::F64(v + delta as f64)),
            Self::String(_) => self
                .as_i64()?
                .checked_add(delta)
                .map(|sum| Self::String(sum.to_string()))
                .ok_or_else(|| overflow(Kind::String, delta)),
            Self::Bool(_) | Self::Duration(_) | Self::Timestamp(_) | Self::Bytes(_) => Err(not_numeric(self.kind())),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "range is checked before the cast and truncation toward zero is intended"
)]
fn truncate(value: f64) -> Result<i64> {
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(value.trunc() as i64)
    } else {
        Err(Error::conversion(format!("{value} does not fit in i64")))
    }
}

fn not_numeric(kind: Kind) -> Error {
    Error::conversion(format!("values of kind {kind} are not numeric"))
}

fn overflow(kind: Kind, delta: i64) -> Error {
    Error::conversion(format!("adding {delta} overflows the {kind} range"))
}

macro_rules! value_conversions {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(Error::conversion(format!(
                            "expected a {} value, found {}",
                            Kind::$variant,
                            other.kind()
                        ))),
                    }
                }
            }
        )*
    };
}

value_conversions! {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Duration(Duration),
    Timestamp(Timestamp),
    Bytes(Vec<u8>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}
