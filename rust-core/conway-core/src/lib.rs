//! # Conway Core
//!
//! Nullable and optional value wrappers for services that move data
//! between JSON payloads and SQL rows, plus the coercion engine that fills
//! typed destinations from dynamic driver values.
//!
//! ## Modules
//!
//! - `nullable` - Two-state wrapper (valid or null)
//! - `optional` - Three-state wrapper (valid, null or undefined)
//! - `coerce` - Dynamic value to typed destination conversion
//! - `value` - The dynamic value set produced by drivers
//! - `text` - Textual forms and strict parsers used by coercion
//! - `json` - JSON encoding with simd-json parsing
//! - `database` - SQLx row reading and parameter binding (SQLite, PostgreSQL)
//! - `config` - Environment-driven logging and PostgreSQL settings
//! - `telemetry` - Tracing subscriber setup
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod coerce;
pub mod config;
pub mod database;
pub mod error;
pub mod json;
pub mod nullable;
pub mod optional;
pub mod telemetry;
pub mod text;
pub mod value;

pub use coerce::{coerce_into, coerce_into_slot, Coerce, Kind};
pub use config::{LogLevel, PgConfig, TelemetryConfig};
pub use database::{
    bind_sqlite, pg_row_to_map, scan_pg_column, scan_sqlite_column, sqlite_row_to_map, PgRawValue,
};
pub use error::{Error, ParseError, Result};
pub use json::{parse_json, to_json};
pub use nullable::Nullable;
pub use optional::Optional;
pub use telemetry::init_tracing;
pub use value::{Opaque, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
