//! Conversions between libsql values and domain types.
//!
//! Timestamps are stored as RFC 3339 text with millisecond precision and a `Z`
//! suffix so that lexical order matches chronological order. Dates are `YYYY-MM-DD`.

use crate::domain::{DocumentKind, DomainError, EntityId, ProjectStatus, TaskStatus};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use libsql::{Row, Value};
use serde::Serialize;
use serde::de::DeserializeOwned;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maps a libsql error into the domain. Constraint failures become `Conflict`.
pub(crate) fn repo_err(err: libsql::Error) -> DomainError {
    let msg = err.to_string();
    if msg.contains("constraint failed") {
        DomainError::Conflict(msg)
    } else {
        DomainError::Repo(msg)
    }
}

/// A table-backed entity with a fixed column list.
pub(crate) trait Record: Sized {
    /// Entity name used in `NotFound` errors and logs.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Column list in the order `from_row` reads them.
    const COLUMNS: &'static str;

    fn from_row(row: &Row) -> Result<Self, DomainError>;
}

/// Values bindable as SQL parameters.
pub(crate) trait SqlValue {
    fn sql(&self) -> Value;
}

impl SqlValue for i64 {
    fn sql(&self) -> Value {
        Value::Integer(*self)
    }
}

impl SqlValue for f64 {
    fn sql(&self) -> Value {
        Value::Real(*self)
    }
}

impl SqlValue for bool {
    fn sql(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl SqlValue for str {
    fn sql(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl SqlValue for String {
    fn sql(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl SqlValue for NaiveDate {
    fn sql(&self) -> Value {
        Value::Text(self.format(DATE_FORMAT).to_string())
    }
}

impl SqlValue for DateTime<Utc> {
    fn sql(&self) -> Value {
        Value::Text(format_timestamp(self))
    }
}

impl<T: SqlValue> SqlValue for Option<T> {
    fn sql(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::sql)
    }
}

impl<T: SqlValue + ?Sized> SqlValue for &T {
    fn sql(&self) -> Value {
        (**self).sql()
    }
}

macro_rules! enum_sql_value {
    ($($ty:ty),*) => {
        $(impl SqlValue for $ty {
            fn sql(&self) -> Value {
                Value::Text(enum_text(self))
            }
        })*
    };
}

enum_sql_value!(ProjectStatus, TaskStatus, DocumentKind);

/// snake_case name of a unit enum, as serialized by serde.
pub(crate) fn enum_text<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as stored in `created_at`/`updated_at`.
pub(crate) fn now() -> Value {
    Utc::now().sql()
}

fn column(row: &Row, idx: i32) -> Result<Value, DomainError> {
    row.get_value(idx).map_err(repo_err)
}

fn type_err(idx: i32, expected: &str, got: &Value) -> DomainError {
    DomainError::Repo(format!("column {idx}: expected {expected}, got {got:?}"))
}

pub(crate) fn id(row: &Row, idx: i32) -> Result<EntityId, DomainError> {
    int(row, idx)
}

pub(crate) fn int(row: &Row, idx: i32) -> Result<i64, DomainError> {
    match column(row, idx)? {
        Value::Integer(i) => Ok(i),
        other => Err(type_err(idx, "integer", &other)),
    }
}

pub(crate) fn opt_int(row: &Row, idx: i32) -> Result<Option<i64>, DomainError> {
    match column(row, idx)? {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(i)),
        other => Err(type_err(idx, "integer", &other)),
    }
}

pub(crate) fn real(row: &Row, idx: i32) -> Result<f64, DomainError> {
    opt_real(row, idx)?.ok_or_else(|| type_err(idx, "real", &Value::Null))
}

pub(crate) fn opt_real(row: &Row, idx: i32) -> Result<Option<f64>, DomainError> {
    match column(row, idx)? {
        Value::Null => Ok(None),
        Value::Real(f) => Ok(Some(f)),
        Value::Integer(i) => Ok(Some(i as f64)),
        other => Err(type_err(idx, "real", &other)),
    }
}

pub(crate) fn boolean(row: &Row, idx: i32) -> Result<bool, DomainError> {
    Ok(int(row, idx)? != 0)
}

pub(crate) fn text(row: &Row, idx: i32) -> Result<String, DomainError> {
    opt_text(row, idx)?.ok_or_else(|| type_err(idx, "text", &Value::Null))
}

pub(crate) fn opt_text(row: &Row, idx: i32) -> Result<Option<String>, DomainError> {
    match column(row, idx)? {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        other => Err(type_err(idx, "text", &other)),
    }
}

pub(crate) fn timestamp(row: &Row, idx: i32) -> Result<DateTime<Utc>, DomainError> {
    let raw = text(row, idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DomainError::Repo(format!("column {idx}: bad timestamp {raw:?}: {e}")))
}

pub(crate) fn opt_date(row: &Row, idx: i32) -> Result<Option<NaiveDate>, DomainError> {
    opt_text(row, idx)?
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                .map_err(|e| DomainError::Repo(format!("column {idx}: bad date {raw:?}: {e}")))
        })
        .transpose()
}

pub(crate) fn date(row: &Row, idx: i32) -> Result<NaiveDate, DomainError> {
    opt_date(row, idx)?.ok_or_else(|| type_err(idx, "date", &Value::Null))
}

/// Reads a snake_case enum stored as text.
pub(crate) fn enumeration<T: DeserializeOwned>(row: &Row, idx: i32) -> Result<T, DomainError> {
    let raw = text(row, idx)?;
    serde_json::from_value(serde_json::Value::String(raw.clone()))
        .map_err(|_| DomainError::Repo(format!("column {idx}: unknown variant {raw:?}")))
}
