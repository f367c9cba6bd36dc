// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Text encoding for values held by text-only stores.
//!
//! Numbers and booleans use their canonical decimal and `true`/`false` forms,
//! durations use [`crate::duration`], timestamps use RFC 3339 unless a custom
//! pattern is configured, and byte sequences are written as `<len>:<hex>` so
//! that arbitrary binary content survives the trip through a text store.

use std::str::FromStr;

use jiff::fmt::strtime;
use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::{Error, Kind, Result, Value, duration};

/// How timestamps are rendered to and parsed from text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// RFC 3339, e.g. `2024-06-19T15:22:45Z`.
    #[default]
    Rfc3339,
    /// A `strftime`-style pattern rendered in UTC. Parsed text without an
    /// offset is read as UTC.
    Pattern(String),
}

impl Value {
    /// Encodes the value as text.
    ///
    /// ```
    /// use strata_tier::{TimestampFormat, Value};
    ///
    /// assert_eq!(Value::from(-12_i32).to_text(&TimestampFormat::Rfc3339), "-12");
    /// assert_eq!(Value::from(vec![0xde_u8, 0xad]).to_text(&TimestampFormat::Rfc3339), "2:dead");
    /// ```
    #[must_use]
    pub fn to_text(&self, format: &TimestampFormat) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::I8(v) => v.to_string(),
            Self::I16(v) => v.to_string(),
            Self::I32(v) => v.to_string(),
            Self::I64(v) => v.to_string(),
            Self::U8(v) => v.to_string(),
            Self::U16(v) => v.to_string(),
            Self::U32(v) => v.to_string(),
            Self::U64(v) => v.to_string(),
            Self::F32(v) => v.to_string(),
            Self::F64(v) => v.to_string(),
            Self::String(v) => v.clone(),
            Self::Duration(v) => duration::format(*v),
            Self::Timestamp(v) => format_timestamp(*v, format),
            Self::Bytes(v) => format!("{}:{}", v.len(), hex::encode(v)),
        }
    }

    /// Decodes text produced by [`Value::to_text`] back into a value of `kind`.
    ///
    /// # Errors
    ///
    /// Returns a conversion error when the text is not a valid rendering of
    /// `kind`, including integers outside the kind's range.
    pub fn from_text(kind: Kind, text: &str, format: &TimestampFormat) -> Result<Self> {
        let value = match kind {
            Kind::Bool => match text {
                "true" => Self::Bool(true),
                "false" => Self::Bool(false),
                _ => return Err(Error::conversion(format!("'{text}' is not a bool"))),
            },
            Kind::I8 => Self::I8(parse(text)?),
            Kind::I16 => Self::I16(parse(text)?),
            Kind::I32 => Self::I32(parse(text)?),
            Kind::I64 => Self::I64(parse(text)?),
            Kind::U8 => Self::U8(parse(text)?),
            Kind::U16 => Self::U16(parse(text)?),
            Kind::U32 => Self::U32(parse(text)?),
            Kind::U64 => Self::U64(parse(text)?),
            Kind::F32 => Self::F32(parse(text)?),
            Kind::F64 => Self::F64(parse(text)?),
            Kind::String => Self::String(text.to_owned()),
            Kind::Duration => Self::Duration(duration::parse(text)?),
            Kind::Timestamp => Self::Timestamp(parse_timestamp(text, format)?),
            Kind::Bytes => Self::Bytes(decode_bytes(text)?),
        };
        Ok(value)
    }
}

fn parse<T>(text: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.parse::<T>().map_err(Error::conversion)
}

/// Patterns that cannot render the instant fall back to RFC 3339, which
/// [`parse_timestamp`] also accepts.
fn format_timestamp(timestamp: Timestamp, format: &TimestampFormat) -> String {
    match format {
        TimestampFormat::Rfc3339 => timestamp.to_string(),
        TimestampFormat::Pattern(pattern) => strtime::format(pattern.as_str(), &timestamp.to_zoned(TimeZone::UTC))
            .unwrap_or_else(|_| timestamp.to_string()),
    }
}

fn parse_timestamp(text: &str, format: &TimestampFormat) -> Result<Timestamp> {
    let TimestampFormat::Pattern(pattern) = format else {
        return text.parse::<Timestamp>().map_err(Error::conversion);
    };

    match strtime::parse(pattern.as_str(), text) {
        Ok(parsed) => parsed
            .to_timestamp()
            .or_else(|_| parsed.to_datetime().and_then(|datetime| TimeZone::UTC.to_timestamp(datetime)))
            .map_err(Error::conversion),
        Err(pattern_error) => text.parse::<Timestamp>().ok().ok_or_else(|| Error::conversion(pattern_error)),
    }
}

fn decode_bytes(text: &str) -> Result<Vec<u8>> {
    let (len, digits) = text
        .split_once(':')
        .ok_or_else(|| Error::conversion("byte text is missing its length prefix"))?;
    let len: usize = parse(len)?;
    let bytes = hex::decode(digits).map_err(Error::conversion)?;
    if bytes.len() != len {
        return Err(Error::conversion(format!(
            "byte text declares {len} bytes but holds {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}
