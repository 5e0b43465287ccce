//! # JSON Serialization Module
//!
//! The text codec behind `encode`/`decode` on the value wrappers.
//! Parsing uses simd-json, falling back to serde_json when simd-json rejects
//! the input; serialization uses serde_json.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

/// Parse JSON string to a typed value
///
/// # Errors
///
/// Returns `Error::Decode` if neither parser accepts the input.
pub fn parse_json<T: DeserializeOwned>(json_str: &str) -> Result<T> {
    let mut bytes = json_str.as_bytes().to_vec();
    parse_json_bytes(&mut bytes).or_else(|_| {
        serde_json::from_str(json_str).map_err(|e| Error::Decode {
            reason: e.to_string(),
        })
    })
}

/// Parse JSON bytes to a typed value using simd-json
///
/// simd-json parses in place, so the buffer contents are unspecified
/// afterwards.
///
/// # Errors
///
/// Returns `Error::Decode` if parsing fails.
pub fn parse_json_bytes<T: DeserializeOwned>(bytes: &mut [u8]) -> Result<T> {
    simd_json::from_slice(bytes).map_err(|e| {
        trace!(error = %e, "simd-json rejected input");
        Error::Decode {
            reason: e.to_string(),
        }
    })
}

/// Serialize a value to JSON string
///
/// # Errors
///
/// Returns `Error::Json` if the value fails to serialize.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Serialize a value to pretty-printed JSON string
///
/// # Errors
///
/// Returns `Error::Json` if the value fails to serialize.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Nullable, Optional};
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Account {
        name: String,
        email: Nullable<String>,
        #[serde(default, skip_serializing_if = "Optional::is_undefined")]
        age: Optional<u32>,
    }

    #[test]
    fn test_parse_json_object() {
        let json = r#"{"name": "John", "email": null, "age": 30}"#;
        let account: Account = parse_json(json).unwrap();
        assert_eq!(account.name, "John");
        assert!(account.email.is_null());
        assert_eq!(account.age, Optional::new(30));
    }

    #[test]
    fn test_parse_json_scalar() {
        let n: Nullable<i32> = parse_json("69").unwrap();
        assert_eq!(n, Nullable::new(69));
    }

    #[test]
    fn test_parse_json_bytes() {
        let mut bytes = br#"{"name": "Jane", "email": "j@example.com"}"#.to_vec();
        let account: Account = parse_json_bytes(&mut bytes).unwrap();
        assert_eq!(account.email, Nullable::new("j@example.com".to_string()));
        assert!(account.age.is_undefined());
    }

    #[test]
    fn test_to_json() {
        let account = Account {
            name: "Bob".to_string(),
            email: Nullable::null(),
            age: Optional::undefined(),
        };
        assert_eq!(to_json(&account).unwrap(), r#"{"name":"Bob","email":null}"#);
        assert!(to_json_pretty(&account).unwrap().contains('\n'));
    }

    #[test]
    fn test_invalid_json() {
        let result: Result<Account> = parse_json("not valid json");
        assert!(matches!(result, Err(Error::Decode { .. })));
    }
}
