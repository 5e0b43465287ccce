//! # Nullable Values
//!
//! A two-state wrapper (valid or null) for columns and payload fields that
//! may hold SQL NULL / JSON `null`.
//!
//! Use `Nullable` at the persistence boundary: it can always produce a
//! storable value, including NULL. For "field was never supplied" semantics
//! use [`Optional`](crate::Optional) instead.

use crate::coerce::{coerce_into, Coerce, Kind};
use crate::error::Result;
use crate::json::{parse_json, to_json};
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value that may be null
///
/// When null, the stored value is always `T::default()`; nothing from a
/// previous valid state survives.
///
/// If the field should be omitted when null, add
/// `#[serde(default, skip_serializing_if = "Nullable::is_null")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Nullable<T> {
    value: T,
    valid: bool,
}

impl<T> Nullable<T> {
    /// Create a valid value
    pub const fn new(value: T) -> Self {
        Self { value, valid: true }
    }

    /// Borrow the value if valid
    pub const fn get(&self) -> Option<&T> {
        if self.valid {
            Some(&self.value)
        } else {
            None
        }
    }

    /// Borrow the stored value, which is `T::default()` when null
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Convert into a std `Option`
    pub fn into_option(self) -> Option<T> {
        self.valid.then_some(self.value)
    }

    /// Set a valid value
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.valid = true;
    }

    /// Check if the value is null
    pub const fn is_null(&self) -> bool {
        !self.valid
    }

    /// Check if the value is valid
    pub const fn is_valid(&self) -> bool {
        self.valid
    }
}

impl<T: Default> Nullable<T> {
    /// Create a null value
    pub fn null() -> Self {
        Self::default()
    }

    /// Set the value to null
    pub fn set_null(&mut self) {
        self.value = T::default();
        self.valid = false;
    }

    /// Populate from a driver value
    ///
    /// NULL always succeeds and yields null. Anything else is coerced into
    /// `T`; on failure the wrapper is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the coercion error for `T`.
    pub fn scan(&mut self, src: Value) -> Result<()>
    where
        T: Coerce,
    {
        if src.is_null() {
            self.set_null();
            return Ok(());
        }
        let mut value = T::default();
        coerce_into(&mut value, src)?;
        self.set(value);
        Ok(())
    }
}

impl<T: Clone + Into<Value>> Nullable<T> {
    /// Produce the driver value to store
    ///
    /// Never fails: null stores as [`Value::Null`].
    pub fn to_value(&self) -> Value {
        if self.valid {
            self.value.clone().into()
        } else {
            Value::Null
        }
    }
}

impl<T: Serialize> Nullable<T> {
    /// Encode as JSON; null encodes as `null`
    ///
    /// # Errors
    ///
    /// Returns an error if `T` fails to serialize.
    pub fn encode(&self) -> Result<String> {
        to_json(self)
    }
}

impl<T: DeserializeOwned + Default> Nullable<T> {
    /// Decode from JSON; `null` decodes as null
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON for `T`.
    pub fn decode(text: &str) -> Result<Self> {
        parse_json(text)
    }
}

impl<T: Default> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Self::new)
    }
}

impl<T: Coerce + Default> Coerce for Nullable<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        self.scan(src)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.valid {
            self.value.serialize(serializer)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for Nullable<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_is_null() {
        let n = Nullable::<bool>::default();
        assert!(n.is_null());
        assert_eq!(n, Nullable::null());
    }

    #[test]
    fn test_encode() {
        assert_eq!(Nullable::new(69).encode().unwrap(), "69");
        assert_eq!(Nullable::<i32>::null().encode().unwrap(), "null");
        assert_eq!(Nullable::new(true).encode().unwrap(), "true");
    }

    #[test]
    fn test_decode() {
        let n = Nullable::<i32>::decode("null").unwrap();
        assert!(n.is_null());
        assert_eq!(*n.value(), 0);

        assert_eq!(Nullable::<i32>::decode("69").unwrap(), Nullable::new(69));
        assert_eq!(
            Nullable::<String>::decode(r#""hello""#).unwrap(),
            Nullable::new("hello".to_string())
        );
    }

    #[test]
    fn test_decode_invalid_inner() {
        let err = Nullable::<i32>::decode(r#""not a number""#).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_round_trip() {
        for n in [Nullable::new(-3i64), Nullable::null()] {
            assert_eq!(Nullable::<i64>::decode(&n.encode().unwrap()).unwrap(), n);
        }
    }

    #[test]
    fn test_scan() {
        let mut n = Nullable::new(true);
        n.scan(Value::Null).unwrap();
        assert_eq!(n, Nullable::null());

        n.scan(Value::Bool(true)).unwrap();
        assert_eq!(n, Nullable::new(true));

        let mut id = Nullable::<i64>::null();
        id.scan(Value::from("42")).unwrap();
        assert_eq!(id.get(), Some(&42));
    }

    #[test]
    fn test_scan_error_keeps_state() {
        let mut n = Nullable::new(5u8);
        let err = n.scan(Value::from("300")).unwrap_err();
        assert!(matches!(err, Error::ValueConversion { .. }));
        assert_eq!(n, Nullable::new(5));
    }

    #[test]
    fn test_to_value() {
        assert_eq!(Nullable::new(true).to_value(), Value::Bool(true));
        assert_eq!(Nullable::<bool>::null().to_value(), Value::Null);
        assert_eq!(
            Nullable::new("x".to_string()).to_value(),
            Value::Text("x".to_string())
        );
    }

    #[test]
    fn test_set_null_zeroes_value() {
        let mut n = Nullable::new("secret".to_string());
        n.set_null();
        assert_eq!(n.value(), "");
        n.set_null();
        assert_eq!(n, Nullable::null());
    }

    #[test]
    fn test_option_conversions() {
        assert_eq!(Nullable::from(Some(3)).into_option(), Some(3));
        assert_eq!(Nullable::<i32>::from(None).into_option(), None);
    }

    #[test]
    fn test_struct_field() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Row {
            id: i64,
            nickname: Nullable<String>,
        }

        let row: Row = serde_json::from_str(r#"{"id":1,"nickname":null}"#).unwrap();
        assert!(row.nickname.is_null());
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"id":1,"nickname":null}"#
        );
    }
}
