//! # Database Module
//!
//! Bridges SQLx rows and parameters to [`Value`] so the coercion engine and
//! the [`Nullable`](crate::Nullable)/[`Optional`](crate::Optional) wrappers
//! can sit directly on a SQLite or PostgreSQL result set.
//!
//! Reading works for both backends. Binding is SQLite only: PostgreSQL
//! needs a concrete parameter type even for NULL, so callers bind typed
//! values there themselves.

use crate::coerce::{coerce_into, Coerce, Kind};
use crate::error::{Error, ParseError, Result};
use crate::value::{Opaque, Value};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use sqlx::postgres::{PgRow, PgValueFormat};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, ColumnIndex, Decode, Row, Type, TypeInfo, ValueRef};
use std::collections::HashMap;
use tracing::debug;

/// A SQLite query under construction
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn database_error(context: &str, err: &sqlx::Error) -> Error {
    Error::Database {
        message: format!("{context}: {err}"),
    }
}

fn decode<'r, R, T>(row: &'r R, index: usize) -> Result<T>
where
    R: Row,
    usize: ColumnIndex<R>,
    T: Decode<'r, R::Database> + Type<R::Database>,
{
    row.try_get(index)
        .map_err(|e| database_error(&format!("Column {index} decode failed"), &e))
}

/// Read one SQLite column as a [`Value`]
///
/// The stored value's storage class decides the variant. Integers in a
/// column declared `BOOLEAN` read as booleans; text in a column declared
/// `DATETIME` reads as a timestamp when it parses as one.
///
/// # Errors
///
/// Returns `Error::Database` if the column is missing or fails to decode.
pub fn sqlite_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| database_error("Column lookup failed", &e))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let storage = raw.type_info();
    let declared = row
        .try_column(index)
        .map_err(|e| database_error("Column lookup failed", &e))?
        .type_info()
        .name();

    let value = match (storage.name(), declared) {
        ("INTEGER", "BOOLEAN") => Value::Bool(decode(row, index)?),
        ("INTEGER", _) => Value::Int(decode(row, index)?),
        ("REAL", _) => Value::Float64(decode(row, index)?),
        ("BLOB", _) => Value::Bytes(decode(row, index)?),
        ("TEXT", "DATETIME") => match decode::<_, DateTime<FixedOffset>>(row, index) {
            Ok(ts) => Value::Timestamp(ts),
            Err(err) => {
                debug!(column = index, error = %err, "DATETIME column holds non-timestamp text");
                Value::Text(decode(row, index)?)
            }
        },
        ("TEXT", _) => Value::Text(decode(row, index)?),
        (other, _) => {
            debug!(column = index, storage = other, "Unknown SQLite storage class, reading as text");
            Value::Text(decode(row, index)?)
        }
    };
    Ok(value)
}

/// Read one PostgreSQL column as a [`Value`]
///
/// # Errors
///
/// Returns `Error::Database` if the column is missing or fails to decode.
/// Types with no [`Value`] counterpart read as an opaque [`PgRawValue`].
pub fn pg_value(row: &PgRow, index: usize) -> Result<Value> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| database_error("Column lookup failed", &e))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let column = row
        .try_column(index)
        .map_err(|e| database_error("Column lookup failed", &e))?;

    let value = match column.type_info().name() {
        "BOOL" => Value::Bool(decode(row, index)?),
        "INT2" => Value::Int(decode::<_, i16>(row, index)?.into()),
        "INT4" => Value::Int(decode::<_, i32>(row, index)?.into()),
        "INT8" => Value::Int(decode(row, index)?),
        "FLOAT4" => Value::Float32(decode(row, index)?),
        "FLOAT8" => Value::Float64(decode(row, index)?),
        "BYTEA" => Value::Bytes(decode(row, index)?),
        "TIMESTAMPTZ" => Value::Timestamp(decode::<_, DateTime<Utc>>(row, index)?.fixed_offset()),
        "TIMESTAMP" => Value::Timestamp(
            decode::<_, NaiveDateTime>(row, index)?
                .and_utc()
                .fixed_offset(),
        ),
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" => Value::Text(decode(row, index)?),
        other => {
            let bytes = raw.as_bytes().map_err(|e| Error::Database {
                message: format!("Column {} read failed: {e}", column.name()),
            })?;
            debug!(column = column.name(), pg_type = other, "Carrying undecoded PostgreSQL column as opaque");
            raw_pg_value(other, raw.format(), bytes)
        }
    };
    Ok(value)
}

/// PostgreSQL column of a type with no [`Value`] counterpart
///
/// Carried through [`Value::Opaque`] as the undecoded wire bytes, so rows
/// holding `UUID`, `JSONB`, `NUMERIC` and the like still convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgRawValue {
    /// Declared column type, e.g. `UUID`
    pub type_name: String,
    /// Wire format of `bytes`
    pub format: PgValueFormat,
    /// Column value as received
    pub bytes: Vec<u8>,
}

fn raw_pg_value(type_name: &str, format: PgValueFormat, bytes: &[u8]) -> Value {
    Value::Opaque(Opaque::new(PgRawValue {
        type_name: type_name.to_string(),
        format,
        bytes: bytes.to_vec(),
    }))
}

/// Convert a SQLite row to a map keyed by column name
///
/// # Errors
///
/// Returns the first column read error.
pub fn sqlite_row_to_map(row: &SqliteRow) -> Result<HashMap<String, Value>> {
    row.columns()
        .iter()
        .map(|column| Ok((column.name().to_string(), sqlite_value(row, column.ordinal())?)))
        .collect()
}

/// Convert a PostgreSQL row to a map keyed by column name
///
/// # Errors
///
/// Returns the first column read error.
pub fn pg_row_to_map(row: &PgRow) -> Result<HashMap<String, Value>> {
    row.columns()
        .iter()
        .map(|column| Ok((column.name().to_string(), pg_value(row, column.ordinal())?)))
        .collect()
}

/// Scan a named SQLite column into `dest`
///
/// # Errors
///
/// Returns `Error::Database` for a missing column, otherwise the coercion
/// error for `D`.
pub fn scan_sqlite_column<D: Coerce + ?Sized>(row: &SqliteRow, name: &str, dest: &mut D) -> Result<()> {
    let index = row
        .try_column(name)
        .map_err(|e| database_error("Column lookup failed", &e))?
        .ordinal();
    coerce_into(dest, sqlite_value(row, index)?)
}

/// Scan a named PostgreSQL column into `dest`
///
/// # Errors
///
/// Returns `Error::Database` for a missing column, otherwise the coercion
/// error for `D`.
pub fn scan_pg_column<D: Coerce + ?Sized>(row: &PgRow, name: &str, dest: &mut D) -> Result<()> {
    let index = row
        .try_column(name)
        .map_err(|e| database_error("Column lookup failed", &e))?
        .ordinal();
    coerce_into(dest, pg_value(row, index)?)
}

/// Bind a [`Value`] as the next SQLite parameter
///
/// # Errors
///
/// Returns `Error::UnsupportedCoercion` for opaque values and
/// `Error::ValueConversion` for unsigned integers beyond `i64::MAX`, which
/// SQLite cannot store.
pub fn bind_sqlite(query: SqliteQuery<'_>, value: Value) -> Result<SqliteQuery<'_>> {
    let query = match value {
        Value::Null => query.bind(None::<String>),
        Value::Text(s) => query.bind(s),
        Value::Bytes(b) => query.bind(b),
        Value::Timestamp(ts) => query.bind(ts),
        Value::Bool(b) => query.bind(b),
        Value::Int(i) => query.bind(i),
        Value::UInt(u) => {
            let i = i64::try_from(u).map_err(|_| Error::ValueConversion {
                source_type: "uint64",
                text: u.to_string(),
                dest: Kind::Int(64),
                cause: ParseError::OutOfRange,
            })?;
            query.bind(i)
        }
        Value::Float32(f) => query.bind(f),
        Value::Float64(f) => query.bind(f),
        Value::Opaque(o) => {
            return Err(Error::UnsupportedCoercion {
                source_type: o.type_name(),
                dest: Kind::Other("sqlite parameter"),
            })
        }
    };
    Ok(query)
}
