//! SQL execution abstraction
//!
//! The repository layer depends only on [`SqlHandler`]: three calls
//! (`execute`, `query`, `query_row`) taking a [`RequestContext`](crate::context::RequestContext),
//! a statement with `?` placeholders, and bound [`SqlValue`] arguments.
//!
//! [`SqliteHandler`] is the production adapter. Tests substitute in-memory
//! SQLite or scripted doubles without touching repository code.

mod error;
mod sqlite;
mod traits;

pub use error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, DbResult};
pub use sqlite::SqliteHandler;
pub use traits::{ExecResult, FromSqlValue, Row, Rows, SqlHandler, SqlValue};
