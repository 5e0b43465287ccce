//! # Optional Values
//!
//! A three-state wrapper: valid, null, or undefined ("never supplied").
//!
//! The wire format only knows null and non-null, so undefined is carried by
//! field presence. The enclosing struct must mark each `Optional` field
//! with:
//!
//! ```ignore
//! #[serde(default, skip_serializing_if = "Optional::is_undefined")]
//! ```
//!
//! A missing key then deserializes to undefined (`Optional::default()`) and
//! an undefined field is omitted on output. Encoding an undefined value
//! directly writes `null`, the same as null.
//!
//! Persistence has no notion of undefined, and `Optional` refuses to carry
//! NULL across that boundary in either direction; convert to
//! [`Nullable`] for storage.

use crate::coerce::{coerce_into, Coerce, Kind};
use crate::error::{Error, Result};
use crate::json::{parse_json, to_json};
use crate::nullable::Nullable;
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
enum State {
    Valid,
    Null,
    #[default]
    Undefined,
}

/// A value that may be valid, null, or undefined
///
/// Outside the valid state the stored value is always `T::default()`.
/// The default state is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Optional<T> {
    value: T,
    state: State,
}

impl<T> Optional<T> {
    /// Create a valid value
    pub const fn new(value: T) -> Self {
        Self {
            value,
            state: State::Valid,
        }
    }

    /// Borrow the value
    ///
    /// # Errors
    ///
    /// Returns [`Error::NullValue`] or [`Error::UndefinedValue`] outside the
    /// valid state.
    pub fn get(&self) -> Result<&T> {
        match self.state {
            State::Valid => Ok(&self.value),
            State::Null => Err(Error::NullValue),
            State::Undefined => Err(Error::UndefinedValue),
        }
    }

    /// Take the value
    ///
    /// # Errors
    ///
    /// Same as [`Optional::get`].
    pub fn into_inner(self) -> Result<T> {
        match self.state {
            State::Valid => Ok(self.value),
            State::Null => Err(Error::NullValue),
            State::Undefined => Err(Error::UndefinedValue),
        }
    }

    /// Borrow the value, panicking if it is null or undefined
    ///
    /// Only for call sites where absence is a programming error. Never use
    /// on data that came from outside the process.
    ///
    /// # Panics
    ///
    /// Panics when the value is null or undefined.
    pub fn must_get(&self) -> &T {
        match self.get() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Set a valid value
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.state = State::Valid;
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        self.state == State::Null
    }

    /// Check if the value is undefined
    pub fn is_undefined(&self) -> bool {
        self.state == State::Undefined
    }

    /// Check if the value is valid
    pub fn is_valid(&self) -> bool {
        !self.is_null() && !self.is_undefined()
    }
}

impl<T: Default> Optional<T> {
    /// Create a null value
    pub fn null() -> Self {
        Self {
            value: T::default(),
            state: State::Null,
        }
    }

    /// Create an undefined value
    pub fn undefined() -> Self {
        Self::default()
    }

    /// Set the value to null
    pub fn set_null(&mut self) {
        self.value = T::default();
        self.state = State::Null;
    }

    /// Set the value to undefined
    pub fn set_undefined(&mut self) {
        self.value = T::default();
        self.state = State::Undefined;
    }

    /// Populate from a driver value
    ///
    /// # Errors
    ///
    /// NULL fails with [`Error::UnsupportedCoercion`] since it cannot be
    /// told apart from undefined; otherwise the coercion error for `T`.
    /// The wrapper is unchanged on failure.
    pub fn scan(&mut self, src: Value) -> Result<()>
    where
        T: Coerce,
    {
        if src.is_null() {
            return Err(Error::UnsupportedCoercion {
                source_type: src.type_name(),
                dest: Kind::Optional,
            });
        }
        let mut value = T::default();
        coerce_into(&mut value, src)?;
        self.set(value);
        Ok(())
    }
}

impl<T: Clone + Into<Value>> Optional<T> {
    /// Produce the driver value to store
    ///
    /// # Errors
    ///
    /// Null and undefined fail with [`Error::UnsupportedCoercion`]; store a
    /// [`Nullable`] when NULL must be written.
    pub fn to_value(&self) -> Result<Value> {
        match self.state {
            State::Valid => Ok(self.value.clone().into()),
            State::Null => Err(Error::UnsupportedCoercion {
                source_type: "null optional",
                dest: Kind::Value,
            }),
            State::Undefined => Err(Error::UnsupportedCoercion {
                source_type: "undefined optional",
                dest: Kind::Value,
            }),
        }
    }
}

impl<T: Serialize> Optional<T> {
    /// Encode as JSON; null and undefined both encode as `null`
    ///
    /// # Errors
    ///
    /// Returns an error if `T` fails to serialize.
    pub fn encode(&self) -> Result<String> {
        to_json(self)
    }
}

impl<T: DeserializeOwned + Default> Optional<T> {
    /// Decode from JSON; `null` decodes as null, never undefined
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON for `T`.
    pub fn decode(text: &str) -> Result<Self> {
        parse_json(text)
    }
}

impl<T: Coerce + Default> Coerce for Optional<T> {
    fn kind() -> Kind {
        Kind::Optional
    }

    fn coerce_from(&mut self, src: Value) -> Result<()> {
        self.scan(src)
    }
}

impl<T: Default> From<Nullable<T>> for Optional<T> {
    fn from(value: Nullable<T>) -> Self {
        value.into_option().map_or_else(Self::null, Self::new)
    }
}

impl<T: Default> TryFrom<Optional<T>> for Nullable<T> {
    type Error = Error;

    fn try_from(value: Optional<T>) -> Result<Self> {
        match value.state {
            State::Valid => Ok(Self::new(value.value)),
            State::Null => Ok(Self::null()),
            State::Undefined => Err(Error::UndefinedValue),
        }
    }
}

impl<T: Serialize> Serialize for Optional<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.state {
            State::Valid => self.value.serialize(serializer),
            State::Null | State::Undefined => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for Optional<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<T>::deserialize(deserializer)?;
        Ok(value.map_or_else(Self::null, Self::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct UserPatch {
        #[serde(default, skip_serializing_if = "Optional::is_undefined")]
        name: Optional<String>,
        #[serde(default, skip_serializing_if = "Optional::is_undefined")]
        age: Optional<u8>,
    }

    #[test]
    fn test_default_is_undefined() {
        let o = Optional::<i32>::default();
        assert!(o.is_undefined());
        assert!(!o.is_null());
        assert!(!o.is_valid());
    }

    #[test]
    fn test_get() {
        assert_eq!(*Optional::new(7).get().unwrap(), 7);
        assert!(matches!(
            Optional::<i32>::null().get(),
            Err(Error::NullValue)
        ));
        assert!(matches!(
            Optional::<i32>::undefined().get(),
            Err(Error::UndefinedValue)
        ));
        assert_eq!(Optional::new("a").into_inner().unwrap(), "a");
    }

    #[test]
    fn test_must_get() {
        assert_eq!(*Optional::new(1).must_get(), 1);
    }

    #[test]
    #[should_panic(expected = "option is null")]
    fn test_must_get_null_panics() {
        Optional::<i32>::null().must_get();
    }

    #[test]
    #[should_panic(expected = "option is undefined")]
    fn test_must_get_undefined_panics() {
        Optional::<i32>::undefined().must_get();
    }

    #[test]
    fn test_transitions_zero_value() {
        let mut o = Optional::new(String::from("kept?"));
        o.set_null();
        assert!(o.is_null());
        assert_eq!(o, Optional::null());

        o.set("again".to_string());
        o.set_undefined();
        assert_eq!(o, Optional::undefined());

        o.set_null();
        let once = o.clone();
        o.set_null();
        assert_eq!(o, once);
    }

    #[test]
    fn test_encode() {
        assert_eq!(Optional::new(69).encode().unwrap(), "69");
        assert_eq!(Optional::<i32>::null().encode().unwrap(), "null");
        assert_eq!(Optional::<i32>::undefined().encode().unwrap(), "null");
    }

    #[test]
    fn test_decode_never_undefined() {
        assert_eq!(Optional::<i32>::decode("null").unwrap(), Optional::null());
        assert_eq!(Optional::<i32>::decode("5").unwrap(), Optional::new(5));
    }

    #[test]
    fn test_field_presence() {
        let patch: UserPatch = serde_json::from_str(r#"{"name":null}"#).unwrap();
        assert!(patch.name.is_null());
        assert!(patch.age.is_undefined());

        let patch: UserPatch = crate::json::parse_json(r#"{"age":30}"#).unwrap();
        assert!(patch.name.is_undefined());
        assert_eq!(patch.age, Optional::new(30));
    }

    #[test]
    fn test_undefined_fields_are_omitted() {
        let patch = UserPatch {
            name: Optional::null(),
            age: Optional::undefined(),
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"name":null}"#);
        assert_eq!(serde_json::to_string(&UserPatch::default()).unwrap(), "{}");
    }

    #[test]
    fn test_patch_round_trip() {
        let patch = UserPatch {
            name: Optional::new("Ada".to_string()),
            age: Optional::null(),
        };
        let text = serde_json::to_string(&patch).unwrap();
        assert_eq!(serde_json::from_str::<UserPatch>(&text).unwrap(), patch);
    }

    #[test]
    fn test_scan() {
        let mut o = Optional::<i64>::undefined();
        o.scan(Value::from("12")).unwrap();
        assert_eq!(o, Optional::new(12));
    }

    #[test]
    fn test_scan_null_is_unsupported() {
        let mut o = Optional::<i64>::undefined();
        let err = o.scan(Value::Null).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedCoercion { dest: Kind::Optional, .. }
        ));
        assert!(o.is_undefined());
    }

    #[test]
    fn test_to_value() {
        assert_eq!(Optional::new(2.5f64).to_value().unwrap(), Value::Float64(2.5));
        assert!(matches!(
            Optional::<f64>::null().to_value(),
            Err(Error::UnsupportedCoercion { .. })
        ));
        assert!(matches!(
            Optional::<f64>::undefined().to_value(),
            Err(Error::UnsupportedCoercion { .. })
        ));
    }

    #[test]
    fn test_nullable_bridges() {
        assert_eq!(Optional::from(Nullable::new(1)), Optional::new(1));
        assert_eq!(Optional::from(Nullable::<i32>::null()), Optional::null());

        assert_eq!(Nullable::try_from(Optional::new(4)).unwrap(), Nullable::new(4));
        assert_eq!(
            Nullable::try_from(Optional::<i32>::null()).unwrap(),
            Nullable::null()
        );
        assert!(matches!(
            Nullable::try_from(Optional::<i32>::undefined()),
            Err(Error::UndefinedValue)
        ));
    }
}
