// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Textual durations such as `1h15m30.5s` or `250ms`.
//!
//! A duration is a sequence of decimal numbers, each with an optional fraction
//! and a mandatory unit suffix. Valid units are `ns`, `us` (or `µs`), `ms`,
//! `s`, `m` and `h`. The bare string `0` is also accepted.

use std::fmt::Write;
use std::time::Duration;

use crate::{Error, Result};

const NANOS_PER_SEC: u128 = 1_000_000_000;
const MAX_FRACTION_DIGITS: usize = 18;

/// Renders `duration` in the largest units that express it exactly.
///
/// ```
/// use std::time::Duration;
///
/// assert_eq!(strata_tier::duration::format(Duration::from_millis(90_500)), "1m30.5s");
/// assert_eq!(strata_tier::duration::format(Duration::from_micros(1500)), "1.5ms");
/// ```
#[must_use]
pub fn format(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos, 3));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, 6));
    }

    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let seconds = u128::from(seconds) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());
    let _ = write!(out, "{}s", decimal(seconds, 9));
    out
}

/// Parses a duration written in the format produced by [`format`].
///
/// # Errors
///
/// Returns a conversion error for malformed input, unknown units, negative
/// durations and values too large to represent.
pub fn parse(text: &str) -> Result<Duration> {
    let invalid = || Error::conversion(format!("invalid duration '{text}'"));

    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, tail) = split_digits(rest);
        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(tail) => split_digits(tail),
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_end = tail.find(|c: char| c == '.' || c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let scale = unit_scale(unit).ok_or_else(invalid)?;

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok().ok_or_else(invalid)? };
        let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;

        if !fraction.is_empty() {
            let mut numerator: u128 = 0;
            let mut denominator: u128 = 1;
            for digit in fraction.bytes().take(MAX_FRACTION_DIGITS) {
                numerator = numerator * 10 + u128::from(digit - b'0');
                denominator *= 10;
            }
            nanos = nanos.checked_add(numerator * scale / denominator).ok_or_else(invalid)?;
        }

        total = total.checked_add(nanos).ok_or_else(invalid)?;
        rest = tail;
    }

    let seconds = u64::try_from(total / NANOS_PER_SEC).ok().ok_or_else(invalid)?;
    let subsec = u32::try_from(total % NANOS_PER_SEC).ok().ok_or_else(invalid)?;
    Ok(Duration::new(seconds, subsec))
}

fn split_digits(text: &str) -> (&str, &str) {
    let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    text.split_at(end)
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Writes `value / 10^scale` with trailing fractional zeros removed.
fn decimal(value: u128, scale: u32) -> String {
    let divisor = 10_u128.pow(scale);
    let (whole, fraction) = (value / divisor, value % divisor);
    if fraction == 0 {
        return whole.to_string();
    }
    let width = scale as usize;
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
