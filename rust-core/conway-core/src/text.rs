//! # Textual Rendering and Parsing
//!
//! Pure helpers behind the coercion engine's textual fallback: render a
//! [`Value`] as text (or append it to a reusable buffer) and strictly parse
//! text back into an exact numeric or boolean type.

use crate::error::ParseError;
use crate::value::Value;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::borrow::Cow;
use std::io::Write;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

/// Render a timestamp as RFC 3339 with nanoseconds and a numeric offset
///
/// The output always carries nine fractional digits, so it sorts and
/// round-trips without loss.
#[must_use]
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, false)
}

/// Render a value as text
///
/// Integers use exact base-10 digits, floats the shortest text that
/// round-trips at their own width, booleans `true`/`false`. Text passes
/// through borrowed; bytes are read as UTF-8 (invalid sequences replaced).
///
/// Returns `None` for NULL and opaque values, which have no textual form.
#[must_use]
pub fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    let text = match value {
        Value::Text(s) => Cow::Borrowed(s.as_str()),
        Value::Bytes(b) => String::from_utf8_lossy(b),
        Value::Timestamp(ts) => Cow::Owned(format_timestamp(ts)),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Int(i) => Cow::Owned(i.to_string()),
        Value::UInt(u) => Cow::Owned(u.to_string()),
        Value::Float32(f) => Cow::Owned(f.to_string()),
        Value::Float64(f) => Cow::Owned(f.to_string()),
        Value::Null | Value::Opaque(_) => return None,
    };
    Some(text)
}

/// Append the textual form of a value to `buf`
///
/// Same rendering rules as [`as_text`], without the intermediate `String`
/// for numbers. Returns `false` (leaving `buf` untouched) for NULL and
/// opaque values.
pub fn append_text(buf: &mut Vec<u8>, value: &Value) -> bool {
    match value {
        Value::Text(s) => buf.extend_from_slice(s.as_bytes()),
        Value::Bytes(b) => buf.extend_from_slice(b),
        Value::Timestamp(ts) => buf.extend_from_slice(format_timestamp(ts).as_bytes()),
        Value::Bool(b) => buf.extend_from_slice(if *b { b"true" } else { b"false" }),
        Value::Int(i) => return write!(buf, "{i}").is_ok(),
        Value::UInt(u) => return write!(buf, "{u}").is_ok(),
        Value::Float32(f) => return write!(buf, "{f}").is_ok(),
        Value::Float64(f) => return write!(buf, "{f}").is_ok(),
        Value::Null | Value::Opaque(_) => return false,
    }
    true
}

/// Strictly parse a base-10 integer of exactly the width of `T`
///
/// # Errors
///
/// `ParseError::OutOfRange` when the number does not fit `T`,
/// `ParseError::InvalidSyntax` otherwise.
pub fn parse_int<T>(text: &str) -> Result<T, ParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    text.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ParseError::OutOfRange,
        _ => ParseError::InvalidSyntax,
    })
}

/// Parse a float at the width of `T`, rounding to the nearest representable value
///
/// Finite text that overflows to infinity at this width is rejected; an
/// explicit `inf`/`infinity` is accepted.
///
/// # Errors
///
/// `ParseError::OutOfRange` on overflow, `ParseError::InvalidSyntax` otherwise.
pub fn parse_float<T>(text: &str) -> Result<T, ParseError>
where
    T: FromStr + Into<f64> + Copy,
{
    let parsed = text.parse::<T>().map_err(|_| ParseError::InvalidSyntax)?;
    if parsed.into().is_infinite() && !names_infinity(text) {
        return Err(ParseError::OutOfRange);
    }
    Ok(parsed)
}

fn names_infinity(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Parse the boolean spellings accepted from drivers
///
/// # Errors
///
/// `ParseError::InvalidSyntax` for anything outside the table.
pub fn parse_bool(text: &str) -> Result<bool, ParseError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseError::InvalidSyntax),
    }
}
