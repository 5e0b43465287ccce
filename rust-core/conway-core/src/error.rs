//! # Error Handling
//!
//! Centralized error types for Conway core.
//! Uses `thiserror` for ergonomic error definitions.

use crate::coerce::Kind;
use thiserror::Error;

/// Result type alias for Conway core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for value wrappers and coercion
#[derive(Error, Debug)]
pub enum Error {
    /// Value was read from an `Optional` holding null
    #[error("option is null")]
    NullValue,

    /// Value was read from an `Optional` that was never supplied
    #[error("option is undefined")]
    UndefinedValue,

    /// A NULL source cannot populate a destination that has no null state
    #[error("converting NULL to {dest} is unsupported")]
    IncompatibleNull {
        /// Destination kind that rejected the NULL
        dest: Kind,
    },

    /// No coercion rule bridges the two types
    #[error("converting type {source_type} to type {dest} is unsupported")]
    UnsupportedCoercion {
        /// Name of the source value's type
        source_type: &'static str,
        /// Destination kind
        dest: Kind,
    },

    /// Textual conversion failed to parse or overflowed the destination width
    #[error("converting value of type {source_type} ({text:?}) to {dest}: {cause}")]
    ValueConversion {
        /// Name of the source value's type
        source_type: &'static str,
        /// Text that was parsed
        text: String,
        /// Destination kind
        dest: Kind,
        /// Reason the parse failed
        #[source]
        cause: ParseError,
    },

    /// The destination slot itself is missing
    #[error("destination pointer is nil")]
    NilDestination,

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON payload could not be decoded
    #[error("JSON decode error: {reason}")]
    Decode {
        /// Parser error message
        reason: String,
    },

    /// Database driver error
    #[error("Database error: {message}")]
    Database {
        /// Error message from the driver
        message: String,
    },

    /// Environment setting could not be parsed
    #[error("Invalid configuration for {key}: {value:?}")]
    InvalidConfig {
        /// Environment key
        key: String,
        /// Rejected value
        value: String,
    },

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {message}")]
    Telemetry {
        /// Error message from the subscriber
        message: String,
    },
}

/// Why a textual conversion failed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Text is not a number (or boolean) of the requested kind
    #[error("invalid syntax")]
    InvalidSyntax,

    /// Number does not fit the destination width
    #[error("value out of range")]
    OutOfRange,

    /// Bytes are not valid UTF-8
    #[error("invalid UTF-8")]
    InvalidUtf8,
}
