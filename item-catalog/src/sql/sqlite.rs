//! [`SqlHandler`] over a sqlx SQLite pool

use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Row as _, Sqlite, ValueRef};

use super::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, DbResult};
use super::traits::{ExecResult, Row, Rows, SqlHandler, SqlValue};
use crate::context::RequestContext;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Production SQL handler backed by [`SqlitePool`]
#[derive(Debug, Clone)]
pub struct SqliteHandler {
    pool: SqlitePool,
}

impl SqliteHandler {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SqlHandler for SqliteHandler {
    async fn execute(
        &self,
        ctx: &RequestContext,
        statement: &str,
        args: &[SqlValue],
    ) -> DbResult<ExecResult> {
        let operation = DatabaseOperation::Execute;
        let done = ctx
            .run(bind_all(statement, args).execute(&self.pool))
            .await
            .map_err(|reason| DatabaseError::interrupted(operation, reason))?
            .map_err(|e| map_sqlx_error(operation, e))?;

        Ok(ExecResult::new(
            Some(done.last_insert_rowid()),
            done.rows_affected(),
        ))
    }

    async fn query(
        &self,
        ctx: &RequestContext,
        statement: &str,
        args: &[SqlValue],
    ) -> DbResult<Rows> {
        let operation = DatabaseOperation::Query;
        let fetched = ctx
            .run(bind_all(statement, args).fetch_all(&self.pool))
            .await
            .map_err(|reason| DatabaseError::interrupted(operation, reason))?
            .map_err(|e| map_sqlx_error(operation, e))?;

        let rows = fetched
            .iter()
            .map(decode_row)
            .collect::<DbResult<Vec<_>>>()?;
        Ok(Rows::new(rows))
    }

    async fn query_row(
        &self,
        ctx: &RequestContext,
        statement: &str,
        args: &[SqlValue],
    ) -> DbResult<Row> {
        let operation = DatabaseOperation::QueryRow;
        let fetched = ctx
            .run(bind_all(statement, args).fetch_optional(&self.pool))
            .await
            .map_err(|reason| DatabaseError::interrupted(operation, reason))?
            .map_err(|e| map_sqlx_error(operation, e))?;

        match fetched {
            Some(row) => decode_row(&row),
            None => Err(DatabaseError::no_rows()),
        }
    }
}

fn bind_all<'q>(statement: &'q str, args: &'q [SqlValue]) -> SqliteQuery<'q> {
    args.iter()
        .fold(sqlx::query(statement), |query, arg| match arg {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Timestamp(ts) => query.bind(SqlValue::encode_timestamp(ts)),
        })
}

/// Copy a driver row into an owned [`Row`]
///
/// SQLite is dynamically typed, so each column is read as an integer first and
/// as text otherwise.
fn decode_row(row: &SqliteRow) -> DbResult<Row> {
    let mut values = Vec::with_capacity(row.len());

    for index in 0..row.len() {
        let is_null = row
            .try_get_raw(index)
            .map_err(|e| map_sqlx_error(DatabaseOperation::Scan, e))?
            .is_null();

        let value = if is_null {
            SqlValue::Null
        } else if let Ok(v) = row.try_get::<i64, _>(index) {
            SqlValue::Integer(v)
        } else {
            row.try_get::<String, _>(index)
                .map(SqlValue::Text)
                .map_err(|e| DatabaseError::type_conversion(index, e.to_string()))?
        };
        values.push(value);
    }

    Ok(Row::new(values))
}

/// Categorize a driver error
fn map_sqlx_error(operation: DatabaseOperation, err: sqlx::Error) -> DatabaseError {
    use sqlx::error::ErrorKind;
    use sqlx::Error;

    match &err {
        Error::RowNotFound => DatabaseError::no_rows().with_operation(operation),
        Error::PoolTimedOut => DatabaseError::new(
            DatabaseOperation::PoolAcquire,
            DatabaseErrorKind::PoolExhausted,
            "connection pool timeout - database may be overloaded",
        ),
        Error::PoolClosed | Error::Io(_) | Error::Tls(_) | Error::WorkerCrashed => {
            DatabaseError::connection_failed(err.to_string()).with_operation(operation)
        }
        Error::Database(db)
            if matches!(
                db.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
            ) =>
        {
            DatabaseError::constraint_violation(operation, db.message().to_string())
        }
        Error::ColumnDecode { .. }
        | Error::Decode(_)
        | Error::ColumnNotFound(_)
        | Error::ColumnIndexOutOfBounds { .. } => DatabaseError::new(
            DatabaseOperation::Scan,
            DatabaseErrorKind::TypeConversion,
            err.to_string(),
        ),
        _ => DatabaseError::query_failed(operation, err.to_string()),
    }
}
