//! SQL execution contract
//!
//! The repository talks to storage only through [`SqlHandler`]. A production
//! adapter ([`SqliteHandler`](super::SqliteHandler)) and test doubles implement
//! the same three calls, so swapping one for the other does not change
//! repository behaviour.

use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};

use super::error::{DatabaseError, DbResult};
use crate::context::RequestContext;

/// A bound parameter or a fetched column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
    /// Bound as RFC 3339 text with microsecond precision
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Canonical text encoding for timestamps
    pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

/// Conversion from a fetched column value
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String>;
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Integer(v) => Ok(*v),
            SqlValue::Text(s) => s
                .parse()
                .map_err(|_| format!("cannot read {:?} as integer", s)),
            other => Err(format!("expected integer, got {}", other.type_name())),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            SqlValue::Integer(v) => Ok(v.to_string()),
            SqlValue::Timestamp(ts) => Ok(SqlValue::encode_timestamp(ts)),
            SqlValue::Null => Err("expected text, got null".to_string()),
        }
    }
}

impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Timestamp(ts) => Ok(*ts),
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| format!("cannot read {:?} as timestamp: {}", s, e)),
            other => Err(format!("expected timestamp, got {}", other.type_name())),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> Result<Self, String> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

/// A single fetched row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read column `index` as `T`
    pub fn get<T: FromSqlValue>(&self, index: usize) -> DbResult<T> {
        let value = self.values.get(index).ok_or_else(|| {
            DatabaseError::type_conversion(
                index,
                format!("row has {} columns", self.values.len()),
            )
        })?;
        T::from_sql_value(value).map_err(|msg| DatabaseError::type_conversion(index, msg))
    }
}

/// Materialized row cursor
///
/// Adapters drain the driver stream (and surface its errors) before handing
/// the cursor back, so iteration itself cannot fail.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    rows: std::vec::IntoIter<Row>,
}

impl Rows {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.len() == 0
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }
}

/// Outcome of an [`SqlHandler::execute`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    last_insert_id: Option<i64>,
    rows_affected: u64,
}

impl ExecResult {
    pub fn new(last_insert_id: Option<i64>, rows_affected: u64) -> Self {
        Self {
            last_insert_id,
            rows_affected,
        }
    }

    /// Identifier generated by the last insert, if the driver reports one
    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

/// Minimal SQL execution interface
///
/// Every call takes a [`RequestContext`]; implementations must stop waiting on
/// the statement once the context is cancelled or expired and report
/// [`DatabaseErrorKind::Cancelled`](super::DatabaseErrorKind::Cancelled) or
/// [`DatabaseErrorKind::Timeout`](super::DatabaseErrorKind::Timeout).
pub trait SqlHandler: Send + Sync {
    /// Run a statement that returns no rows
    fn execute(
        &self,
        ctx: &RequestContext,
        statement: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<ExecResult>> + Send;

    /// Run a statement and collect its rows
    fn query(
        &self,
        ctx: &RequestContext,
        statement: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<Rows>> + Send;

    /// Run a statement expected to return one row
    ///
    /// Fails with [`DatabaseErrorKind::NoRows`](super::DatabaseErrorKind::NoRows)
    /// when nothing matches.
    fn query_row(
        &self,
        ctx: &RequestContext,
        statement: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<Row>> + Send;

    /// Round-trip to storage; used by the readiness probe
    fn ping(&self, ctx: &RequestContext) -> impl Future<Output = DbResult<()>> + Send {
        async move {
            self.query_row(ctx, "SELECT 1", &[]).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::DatabaseErrorKind;
    use chrono::TimeZone;

    #[test]
    fn test_row_get_typed_columns() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let row = Row::new(vec![
            SqlValue::Integer(42),
            SqlValue::from("時計"),
            SqlValue::Text(SqlValue::encode_timestamp(&ts)),
            SqlValue::Null,
        ]);

        assert_eq!(row.get::<i64>(0).unwrap(), 42);
        assert_eq!(row.get::<String>(1).unwrap(), "時計");
        assert_eq!(row.get::<DateTime<Utc>>(2).unwrap(), ts);
        assert_eq!(row.get::<Option<String>>(3).unwrap(), None);
    }

    #[test]
    fn test_row_get_out_of_range() {
        let row = Row::new(vec![SqlValue::Integer(1)]);
        let err = row.get::<i64>(5).unwrap_err();
        assert_eq!(err.kind, DatabaseErrorKind::TypeConversion);
        assert_eq!(err.context.as_deref(), Some("column 5"));
    }

    #[test]
    fn test_row_get_wrong_type() {
        let row = Row::new(vec![SqlValue::Text("abc".into())]);
        let err = row.get::<i64>(0).unwrap_err();
        assert_eq!(err.kind, DatabaseErrorKind::TypeConversion);
    }

    #[test]
    fn test_timestamp_encoding_round_trips_through_text() {
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let encoded = SqlValue::encode_timestamp(&ts);
        assert_eq!(encoded, "2023-01-01T00:00:00.000000Z");
        let decoded = DateTime::<Utc>::from_sql_value(&SqlValue::Text(encoded)).unwrap();
        assert_eq!(decoded, ts);
    }

    #[test]
    fn test_rows_iterates_in_order() {
        let mut rows = Rows::new(vec![
            Row::new(vec![SqlValue::Integer(1)]),
            Row::new(vec![SqlValue::Integer(2)]),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.next().unwrap().get::<i64>(0).unwrap(), 1);
        assert_eq!(rows.next().unwrap().get::<i64>(0).unwrap(), 2);
        assert!(rows.next().is_none());
        assert!(rows.is_empty());
    }
}
