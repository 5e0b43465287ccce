//! # Value Coercion
//!
//! Converts one dynamic [`Value`] into one statically typed destination
//! without silent precision loss. Every destination type implements
//! [`Coerce`] as a `match` over the closed [`Value`] set, so the rule that
//! applies is chosen per destination at compile time.
//!
//! ## Rules (first match wins)
//!
//! 1. Direct fast paths: text, bytes, booleans (driver table), [`Value`] as-is.
//! 2. Timestamps copy into timestamp slots and render as RFC 3339 text/bytes.
//! 3. NULL clears [`Value`] and byte slots; any other static slot rejects it.
//! 4. Self-describing slots ([`Nullable`](crate::Nullable),
//!    [`Optional`](crate::Optional)) scan the value themselves.
//! 5. An [`Opaque`] holding exactly the destination type is cloned in.
//! 6. Integers and floats of the same kind convert when lossless; a float
//!    fills an integer slot only when it holds that integer exactly.
//! 7. Anything else with a textual form is rendered and strictly parsed at
//!    the destination's exact width.
//! 8. `Option<T>` slots map NULL to `None` and otherwise coerce a fresh `T`.
//! 9. No match: [`Error::UnsupportedCoercion`].

use crate::error::{Error, ParseError, Result};
use crate::text::{append_text, as_text, format_timestamp, parse_bool, parse_float, parse_int};
use crate::value::{Opaque, Value};
use chrono::{DateTime, FixedOffset, Utc};
use std::any::Any;
use std::fmt;

/// Destination kind, reported in coercion errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// UTF-8 string
    Text,
    /// Byte sequence
    Bytes,
    /// Boolean
    Bool,
    /// Signed integer with the given bit width
    Int(u32),
    /// Unsigned integer with the given bit width
    UInt(u32),
    /// Float with the given bit width
    Float(u32),
    /// Timestamp
    Timestamp,
    /// Untyped [`Value`] passthrough
    Value,
    /// Three-state [`Optional`](crate::Optional)
    Optional,
    /// Application-defined destination
    Other(&'static str),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Bytes => write!(f, "bytes"),
            Self::Bool => write!(f, "bool"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::UInt(bits) => write!(f, "uint{bits}"),
            Self::Float(bits) => write!(f, "float{bits}"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Value => write!(f, "value"),
            Self::Optional => write!(f, "optional"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A destination slot that can be populated from a dynamic [`Value`]
///
/// Implementations must leave `self` unchanged when they return an error.
pub trait Coerce {
    /// Kind reported in errors for this destination
    fn kind() -> Kind
    where
        Self: Sized;

    /// Replace `self` with `src` converted to this type
    ///
    /// # Errors
    ///
    /// Returns the coercion error for the first rule that applies and fails,
    /// or [`Error::UnsupportedCoercion`] if no rule applies.
    fn coerce_from(&mut self, src: Value) -> Result<()>;
}

/// Convert `src` into `dest`
///
/// # Errors
///
/// See [`Coerce::coerce_from`].
pub fn coerce_into<D: Coerce + ?Sized>(dest: &mut D, src: Value) -> Result<()> {
    dest.coerce_from(src)
}

/// Convert `src` into an optional destination slot
///
/// # Errors
///
/// Returns [`Error::NilDestination`] when `dest` is `None`, otherwise as
/// [`coerce_into`].
pub fn coerce_into_slot<D: Coerce + ?Sized>(dest: Option<&mut D>, src: Value) -> Result<()> {
    dest.ok_or(Error::NilDestination)?.coerce_from(src)
}

fn incompatible_null<D: Coerce>() -> Error {
    Error::IncompatibleNull { dest: D::kind() }
}

fn unsupported<D: Coerce>(src: &Value) -> Error {
    Error::UnsupportedCoercion {
        source_type: src.type_name(),
        dest: D::kind(),
    }
}

fn conversion<D: Coerce>(src: &Value, text: String, cause: ParseError) -> Error {
    Error::ValueConversion {
        source_type: src.type_name(),
        text,
        dest: D::kind(),
        cause,
    }
}

fn assign_opaque<D: Coerce + Clone + Any>(opaque: &Opaque, src: &Value) -> Result<D> {
    opaque
        .downcast_ref::<D>()
        .cloned()
        .ok_or_else(|| unsupported::<D>(src))
}

fn parse_fallback<D: Coerce>(
    src: &Value,
    parse: impl FnOnce(&str) -> std::result::Result<D, ParseError>,
) -> Result<D> {
    let text = as_text(src).ok_or_else(|| unsupported::<D>(src))?;
    match parse(&text) {
        Ok(value) => Ok(value),
        Err(cause) => Err(conversion::<D>(src, text.into_owned(), cause)),
    }
}

impl Coerce for String {
    fn kind() -> Kind {
        Kind::Text
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        *self = match src {
            Value::Text(s) => s,
            Value::Bytes(b) => String::from_utf8(b).map_err(|e| Error::ValueConversion {
                source_type: "bytes",
                text: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                dest: Kind::Text,
                cause: ParseError::InvalidUtf8,
            })?,
            Value::Timestamp(ts) => format_timestamp(&ts),
            Value::Null => return Err(incompatible_null::<Self>()),
            Value::Opaque(ref o) => assign_opaque::<Self>(o, &src)?,
            Value::Bool(_)
            | Value::Int(_)
            | Value::UInt(_)
            | Value::Float32(_)
            | Value::Float64(_) => as_text(&src)
                .ok_or_else(|| unsupported::<Self>(&src))?
                .into_owned(),
        };
        Ok(())
    }
}

impl Coerce for Vec<u8> {
    fn kind() -> Kind {
        Kind::Bytes
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        *self = match src {
            Value::Text(s) => s.into_bytes(),
            Value::Bytes(b) => b,
            Value::Timestamp(ts) => format_timestamp(&ts).into_bytes(),
            Value::Null => Vec::new(),
            Value::Opaque(ref o) => assign_opaque::<Self>(o, &src)?,
            Value::Bool(_)
            | Value::Int(_)
            | Value::UInt(_)
            | Value::Float32(_)
            | Value::Float64(_) => {
                let mut buf = std::mem::take(self);
                buf.clear();
                append_text(&mut buf, &src);
                buf
            }
        };
        Ok(())
    }
}

impl Coerce for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        *self = match src {
            Value::Bool(b) => b,
            Value::Text(_) | Value::Bytes(_) => parse_fallback::<Self>(&src, parse_bool)?,
            Value::Int(1) | Value::UInt(1) => true,
            Value::Int(0) | Value::UInt(0) => false,
            Value::Int(i) => {
                return Err(conversion::<Self>(&src, i.to_string(), ParseError::OutOfRange))
            }
            Value::UInt(u) => {
                return Err(conversion::<Self>(&src, u.to_string(), ParseError::OutOfRange))
            }
            Value::Null => return Err(incompatible_null::<Self>()),
            Value::Opaque(ref o) => assign_opaque::<Self>(o, &src)?,
            Value::Timestamp(_) | Value::Float32(_) | Value::Float64(_) => {
                return Err(unsupported::<Self>(&src))
            }
        };
        Ok(())
    }
}

/// Convert a float holding an exact integer; anything else is rejected
///
/// Float text is never reparsed as an integer: shortest round-trip digits
/// of a large float are not the integer it holds.
fn integral_float<D>(src: &Value, f: f64) -> Result<D>
where
    D: Coerce + TryFrom<i128>,
{
    // 2^127 as f64; every integral f64 below it casts to i128 exactly
    const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

    let text = || as_text(src).map_or_else(String::new, std::borrow::Cow::into_owned);
    if f.is_infinite() || f.abs() >= I128_BOUND {
        return Err(conversion::<D>(src, text(), ParseError::OutOfRange));
    }
    if f.is_nan() || f.fract() != 0.0 {
        return Err(conversion::<D>(src, text(), ParseError::InvalidSyntax));
    }
    #[allow(clippy::cast_possible_truncation)]
    let n = f as i128;
    D::try_from(n).map_err(|_| conversion::<D>(src, text(), ParseError::OutOfRange))
}

macro_rules! coerce_integer {
    ($variant:ident => $kind:ident: $($ty:ty),*) => {$(
        impl Coerce for $ty {
            fn kind() -> Kind {
                Kind::$kind(<$ty>::BITS)
            }

            fn coerce_from(&mut self, src: Value) -> Result<()> {
                *self = match src {
                    Value::Null => return Err(incompatible_null::<Self>()),
                    Value::Opaque(ref o) => assign_opaque::<Self>(o, &src)?,
                    Value::$variant(n) => match Self::try_from(n).ok() {
                        Some(v) => v,
                        None => parse_fallback::<Self>(&src, parse_int)?,
                    },
                    Value::Float32(f) => integral_float::<Self>(&src, f64::from(f))?,
                    Value::Float64(f) => integral_float::<Self>(&src, f)?,
                    _ => parse_fallback::<Self>(&src, parse_int)?,
                };
                Ok(())
            }
        }
    )*};
}

coerce_integer!(Int => Int: i8, i16, i32, i64, isize);
coerce_integer!(UInt => UInt: u8, u16, u32, u64, usize);

impl Coerce for f64 {
    fn kind() -> Kind {
        Kind::Float(64)
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        *self = match src {
            Value::Float64(f) => f,
            Value::Float32(f) => Self::from(f),
            Value::Null => return Err(incompatible_null::<Self>()),
            Value::Opaque(ref o) => assign_opaque::<Self>(o, &src)?,
            _ => parse_fallback::<Self>(&src, parse_float)?,
        };
        Ok(())
    }
}

impl Coerce for f32 {
    fn kind() -> Kind {
        Kind::Float(32)
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        *self = match src {
            Value::Float32(f) => f,
            Value::Null => return Err(incompatible_null::<Self>()),
            Value::Opaque(ref o) => assign_opaque::<Self>(o, &src)?,
            // narrowing goes through text so overflow is caught
            _ => parse_fallback::<Self>(&src, parse_float)?,
        };
        Ok(())
    }
}

impl Coerce for DateTime<FixedOffset> {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        *self = match src {
            Value::Timestamp(ts) => ts,
            Value::Null => return Err(incompatible_null::<Self>()),
            Value::Opaque(ref o) => assign_opaque::<Self>(o, &src)?,
            _ => return Err(unsupported::<Self>(&src)),
        };
        Ok(())
    }
}

impl Coerce for DateTime<Utc> {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        *self = match src {
            Value::Timestamp(ts) => ts.with_timezone(&Utc),
            Value::Null => return Err(incompatible_null::<Self>()),
            Value::Opaque(ref o) => assign_opaque::<Self>(o, &src)?,
            _ => return Err(unsupported::<Self>(&src)),
        };
        Ok(())
    }
}

impl Coerce for Value {
    fn kind() -> Kind {
        Kind::Value
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        *self = src;
        Ok(())
    }
}

impl<T: Coerce + Default> Coerce for Option<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        if src.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.coerce_from(src)?;
        *self = Some(inner);
        Ok(())
    }
}
