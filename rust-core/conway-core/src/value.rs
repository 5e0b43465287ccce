//! # Dynamic Values
//!
//! The closed set of loosely typed values exchanged with a persistence driver.
//! Every coercion rule is defined over exactly these shapes.

use chrono::{DateTime, FixedOffset, Utc};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Driver-level value read from or written to storage
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    /// UTF-8 text
    Text(String),
    /// Raw byte sequence
    Bytes(Vec<u8>),
    /// Timestamp with a fixed UTC offset
    Timestamp(DateTime<FixedOffset>),
    /// Boolean
    Bool(bool),
    /// Signed integer of any width
    Int(i64),
    /// Unsigned integer of any width
    UInt(u64),
    /// Single precision float
    Float32(f32),
    /// Double precision float
    Float64(f64),
    /// Passthrough value of a type the driver understands but this crate does not
    Opaque(Opaque),
}

impl Value {
    /// Name of the value's type, used in error messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Timestamp(_) => "timestamp",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int64",
            Self::UInt(_) => "uint64",
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::Opaque(o) => o.type_name(),
        }
    }

    /// Check if value is SQL NULL
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Type-erased immutable value passed through unchanged
///
/// Equality is identity: two `Opaque`s are equal only if they share the same
/// allocation.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    /// Wrap a value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    /// Concrete type name of the wrapped value
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the wrapped value if it is a `T`
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

macro_rules! value_from {
    ($variant:ident: $($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v.into())
            }
        }
    )*};
}

value_from!(Int: i8, i16, i32, i64);
value_from!(UInt: u8, u16, u32, u64);
value_from!(Text: String, &str);
value_from!(Bytes: Vec<u8>, &[u8]);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        // isize is at most 64 bits on every supported target
        Self::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v.fixed_offset())
    }
}

impl From<Opaque> for Value {
    fn from(v: Opaque) -> Self {
        Self::Opaque(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_integers_widen() {
        assert_eq!(Value::from(-5i8), Value::Int(-5));
        assert_eq!(Value::from(7u16), Value::UInt(7));
        assert_eq!(Value::from(42usize), Value::UInt(42));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("hi")), Value::Text("hi".to_string()));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Float32(1.5).type_name(), "float32");
        assert_eq!(Value::from(Opaque::new(3u8)).type_name(), "u8");
    }

    #[test]
    fn test_opaque_downcast() {
        let opaque = Opaque::new(vec![1u32, 2, 3]);
        assert_eq!(opaque.downcast_ref::<Vec<u32>>(), Some(&vec![1, 2, 3]));
        assert!(opaque.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_opaque_equality_is_identity() {
        let a = Opaque::new(1i32);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Opaque::new(1i32));
    }

    #[test]
    fn test_default_is_null() {
        assert!(Value::default().is_null());
    }
}
