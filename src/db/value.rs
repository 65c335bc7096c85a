//! Literal values carried next to structural SQL text.
//!
//! A `BindValue` is everything a request can contribute to a statement. The
//! binder decides whether it travels as a positional parameter or is rendered
//! into the text through [`BindValue::to_literal`].

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use postgres::types::ToSql;
use serde::Serialize;

use super::escape::escape_literal;

/// Timestamp layout used when a value is rendered into the statement text.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A literal value bound into a composed statement.
///
/// Serializes adjacently tagged, e.g. `{"type": "timestamp", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum BindValue {
    Int(i64),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Text(String),
}

impl BindValue {
    /// Render as an escaped PostgreSQL literal.
    ///
    /// Returns `None` for text that cannot be represented (NUL bytes).
    pub fn to_literal(&self) -> Option<String> {
        match self {
            BindValue::Int(i) => Some(i.to_string()),
            BindValue::Timestamp(ts) => Some(format!(
                "'{}'::timestamp",
                ts.format(TIMESTAMP_FORMAT)
            )),
            BindValue::Date(d) => Some(format!("'{}'::date", d.format(DATE_FORMAT))),
            BindValue::Text(s) => escape_literal(s),
        }
    }

    /// Borrow the inner value as a `postgres` parameter.
    pub fn as_sql_param(&self) -> &(dyn ToSql + Sync) {
        match self {
            BindValue::Int(i) => i as &(dyn ToSql + Sync),
            BindValue::Timestamp(ts) => ts as &(dyn ToSql + Sync),
            BindValue::Date(d) => d as &(dyn ToSql + Sync),
            BindValue::Text(s) => s as &(dyn ToSql + Sync),
        }
    }

    /// Get type name for debugging/error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            BindValue::Int(_) => "int",
            BindValue::Timestamp(_) => "timestamp",
            BindValue::Date(_) => "date",
            BindValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Int(i) => write!(f, "{}", i),
            BindValue::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            BindValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            BindValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        BindValue::Int(value)
    }
}

impl From<NaiveDateTime> for BindValue {
    fn from(value: NaiveDateTime) -> Self {
        BindValue::Timestamp(value)
    }
}

impl From<NaiveDate> for BindValue {
    fn from(value: NaiveDate) -> Self {
        BindValue::Date(value)
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        BindValue::Text(value)
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        BindValue::Text(value.to_string())
    }
}
